//! Media capture capability (camera and microphone).
//!
//! The core never touches a real device: it talks to a `CaptureProvider`
//! and only consumes a stream handle, an image reference, or a typed
//! `CapabilityError`.

use crate::error::CapabilityError;
use futures::future::{BoxFuture, FutureExt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

/// What a caller asks the capability for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub video: Option<VideoConstraints>,
    pub audio: bool,
}

impl CaptureConstraints {
    /// Front camera at 1280x720, no audio.
    pub fn camera() -> Self {
        CaptureConstraints {
            video: Some(VideoConstraints {
                width: 1280,
                height: 720,
                facing: FacingMode::User,
            }),
            audio: false,
        }
    }

    pub fn microphone() -> Self {
        CaptureConstraints {
            video: None,
            audio: true,
        }
    }
}

/// Handle to an acquired stream. Must be given back through `release`.
#[derive(Debug, PartialEq, Eq)]
pub struct CaptureStream {
    pub id: u64,
    pub constraints: CaptureConstraints,
}

impl CaptureStream {
    pub fn has_video(&self) -> bool {
        self.constraints.video.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.constraints.audio
    }
}

/// External media capability.
pub trait CaptureProvider: Send + Sync {
    fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> BoxFuture<'static, Result<CaptureStream, CapabilityError>>;

    fn release(&self, stream: CaptureStream);

    /// Grab the current video frame as an image reference.
    fn capture(&self, stream: &CaptureStream) -> Result<String, CapabilityError>;

    /// Current input level of an audio stream, 0.0..=1.0.
    fn audio_level(&self, stream: &CaptureStream) -> Result<f32, CapabilityError>;
}

/// Encode an SVG document as a `data:` URL.
pub fn svg_data_url(svg: &str) -> String {
    let mut encoded = String::with_capacity(svg.len() + 32);
    for ch in svg.trim().chars() {
        match ch {
            '<' => encoded.push_str("%3C"),
            '>' => encoded.push_str("%3E"),
            '#' => encoded.push_str("%23"),
            '%' => encoded.push_str("%25"),
            '"' => encoded.push('\''),
            '\n' | '\r' => {}
            other => encoded.push(other),
        }
    }
    format!("data:image/svg+xml;charset=UTF-8,{}", encoded)
}

/// A flat coloured placeholder picture with a caption.
pub fn placeholder_photo(color: &str, caption: &str) -> String {
    let svg = format!(
        "<svg width=\"300\" height=\"400\" xmlns=\"http://www.w3.org/2000/svg\">\
         <rect width=\"300\" height=\"400\" fill=\"{}\" />\
         <text x=\"150\" y=\"200\" font-family=\"Arial\" font-size=\"20\" fill=\"white\" text-anchor=\"middle\">{}</text>\
         </svg>",
        color, caption
    );
    svg_data_url(&svg)
}

const PHOTO_COLORS: [&str; 5] = ["#3498db", "#2ecc71", "#e74c3c", "#f39c12", "#9b59b6"];

/// Camera/microphone that fabricates frames instead of reading hardware.
#[derive(Default)]
pub struct SimulatedCapture {
    next_id: AtomicU64,
    active: Arc<AtomicUsize>,
    denied: bool,
}

impl SimulatedCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capture device whose permission prompt is always declined.
    pub fn denying() -> Self {
        SimulatedCapture {
            denied: true,
            ..Self::default()
        }
    }

    /// Number of streams acquired and not yet released.
    pub fn active_streams(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

impl CaptureProvider for SimulatedCapture {
    fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> BoxFuture<'static, Result<CaptureStream, CapabilityError>> {
        if self.denied {
            return futures::future::ready(Err(CapabilityError::PermissionDenied)).boxed();
        }
        if constraints.video.is_none() && !constraints.audio {
            return futures::future::ready(Err(CapabilityError::DeviceError(
                "no tracks requested".to_string(),
            )))
            .boxed();
        }

        let id = self.next_id.fetch_add(1, Ordering::AcqRel) + 1;
        self.active.fetch_add(1, Ordering::AcqRel);
        log::debug!("[Capture] stream {} acquired ({:?})", id, constraints);
        futures::future::ready(Ok(CaptureStream { id, constraints })).boxed()
    }

    fn release(&self, stream: CaptureStream) {
        log::debug!("[Capture] stream {} released", stream.id);
        let _ = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    fn capture(&self, stream: &CaptureStream) -> Result<String, CapabilityError> {
        if !stream.has_video() {
            return Err(CapabilityError::DeviceError(
                "Video no disponible para captura".to_string(),
            ));
        }
        let mut rng = rand::thread_rng();
        let color = PHOTO_COLORS.choose(&mut rng).copied().unwrap_or("#3498db");
        let caption = format!(
            "Foto capturada a las {}",
            chrono::Local::now().format("%H:%M:%S")
        );
        Ok(placeholder_photo(color, &caption))
    }

    fn audio_level(&self, stream: &CaptureStream) -> Result<f32, CapabilityError> {
        if !stream.has_audio() {
            return Err(CapabilityError::DeviceError(
                "stream has no audio track".to_string(),
            ));
        }
        Ok(rand::thread_rng().gen_range(0.0..1.0))
    }
}

/// Capability stand-in for hosts without any capture device.
pub struct UnavailableCapture;

impl CaptureProvider for UnavailableCapture {
    fn acquire(
        &self,
        _constraints: CaptureConstraints,
    ) -> BoxFuture<'static, Result<CaptureStream, CapabilityError>> {
        futures::future::ready(Err(CapabilityError::NotSupported)).boxed()
    }

    fn release(&self, _stream: CaptureStream) {}

    fn capture(&self, _stream: &CaptureStream) -> Result<String, CapabilityError> {
        Err(CapabilityError::NotSupported)
    }

    fn audio_level(&self, _stream: &CaptureStream) -> Result<f32, CapabilityError> {
        Err(CapabilityError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_acquire_and_release() {
        let cam = SimulatedCapture::new();
        let stream = cam.acquire(CaptureConstraints::camera()).await.unwrap();
        assert_eq!(cam.active_streams(), 1);

        let photo = cam.capture(&stream).unwrap();
        assert!(photo.starts_with("data:image/svg+xml"));

        cam.release(stream);
        assert_eq!(cam.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_denied_capture() {
        let cam = SimulatedCapture::denying();
        let err = cam.acquire(CaptureConstraints::camera()).await.unwrap_err();
        assert_eq!(err, CapabilityError::PermissionDenied);
        assert_eq!(cam.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_audio_stream_cannot_take_photos() {
        let cam = SimulatedCapture::new();
        let stream = cam.acquire(CaptureConstraints::microphone()).await.unwrap();
        assert!(cam.capture(&stream).is_err());
        assert!(cam.audio_level(&stream).is_ok());
        cam.release(stream);
    }

    #[tokio::test]
    async fn test_unavailable_capture() {
        let err = UnavailableCapture
            .acquire(CaptureConstraints::camera())
            .await
            .unwrap_err();
        assert_eq!(err, CapabilityError::NotSupported);
    }

    #[test]
    fn test_svg_data_url_escapes_markup() {
        let url = svg_data_url("<svg fill=\"#fff\"></svg>");
        assert_eq!(url, "data:image/svg+xml;charset=UTF-8,%3Csvg fill='%23fff'%3E%3C/svg%3E");
    }
}
