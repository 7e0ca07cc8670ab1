//! Session photo gallery and the open-photo viewer.

use crate::hardware::capture::placeholder_photo;

/// Ordered image references. Lives as long as the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    photos: Vec<String>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gallery seeded with the four sample pictures.
    pub fn with_samples() -> Self {
        Gallery {
            photos: sample_photos(),
        }
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.photos.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Append unconditionally: no cap, no dedup.
    pub fn add(&mut self, photo_url: String) {
        self.photos.push(photo_url);
    }

    /// Remove the photo at `index`. Out of range is a no-op.
    pub fn delete(&mut self, index: usize) -> Option<String> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }
}

fn sample_photos() -> Vec<String> {
    [
        ("#3498db", "Foto de playa"),
        ("#2ecc71", "Foto de montaña"),
        ("#e74c3c", "Foto de atardecer"),
        ("#f39c12", "Foto de amigos"),
    ]
    .iter()
    .map(|(color, caption)| placeholder_photo(color, caption))
    .collect()
}

/// Which photo (if any) is shown full screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryViewer {
    index: Option<usize>,
}

impl GalleryViewer {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    pub fn open(&mut self, index: usize, len: usize) {
        if index < len {
            self.index = Some(index);
        }
    }

    pub fn close(&mut self) {
        self.index = None;
    }

    pub fn next(&mut self, len: usize) {
        if let Some(current) = self.index {
            if len > 0 {
                self.index = Some((current + 1) % len);
            }
        }
    }

    pub fn prev(&mut self, len: usize) {
        if let Some(current) = self.index {
            if len > 0 {
                self.index = Some((current + len - 1) % len);
            }
        }
    }

    /// Keep the viewer on a sensible photo after `index` was deleted from a
    /// gallery that held `len_before` photos.
    pub fn on_deleted(&mut self, index: usize, len_before: usize) {
        let Some(current) = self.index else {
            return;
        };

        if len_before <= 1 {
            self.index = None;
            return;
        }

        let len_after = len_before - 1;
        let next = if index == current {
            if index == len_before - 1 {
                current.saturating_sub(1)
            } else {
                current
            }
        } else if index < current {
            current - 1
        } else {
            current
        };
        self.index = Some(next.min(len_after - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer_at(index: usize) -> GalleryViewer {
        GalleryViewer { index: Some(index) }
    }

    #[test]
    fn test_seeded_with_four_samples() {
        let gallery = Gallery::with_samples();
        assert_eq!(gallery.len(), 4);
        assert!(gallery.photos().iter().all(|p| p.starts_with("data:image/svg+xml")));
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut gallery = Gallery::with_samples();
        assert!(gallery.delete(10).is_none());
        assert_eq!(gallery.len(), 4);
    }

    #[test]
    fn test_add_appends_duplicates() {
        let mut gallery = Gallery::new();
        gallery.add("a".to_string());
        gallery.add("a".to_string());
        assert_eq!(gallery.photos(), &["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_viewer_wraps() {
        let mut viewer = viewer_at(3);
        viewer.next(4);
        assert_eq!(viewer.index(), Some(0));
        viewer.prev(4);
        assert_eq!(viewer.index(), Some(3));
    }

    #[test]
    fn test_delete_last_photo_while_viewing_it() {
        let mut viewer = viewer_at(3);
        viewer.on_deleted(3, 4);
        assert_eq!(viewer.index(), Some(2));
    }

    #[test]
    fn test_delete_current_photo_keeps_position() {
        let mut viewer = viewer_at(1);
        viewer.on_deleted(1, 4);
        assert_eq!(viewer.index(), Some(1));
    }

    #[test]
    fn test_delete_before_current_shifts_back() {
        let mut viewer = viewer_at(2);
        viewer.on_deleted(0, 4);
        assert_eq!(viewer.index(), Some(1));
    }

    #[test]
    fn test_delete_after_current_keeps_index() {
        let mut viewer = viewer_at(1);
        viewer.on_deleted(3, 4);
        assert_eq!(viewer.index(), Some(1));
    }

    #[test]
    fn test_delete_only_photo_closes_viewer() {
        let mut viewer = viewer_at(0);
        viewer.on_deleted(0, 1);
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_closed_viewer_ignores_deletes() {
        let mut viewer = GalleryViewer::default();
        viewer.on_deleted(0, 3);
        assert_eq!(viewer.index(), None);
    }
}
