//! Voice recorder backed by an audio capture stream.

use crate::error::CapabilityError;
use crate::hardware::capture::{CaptureProvider, CaptureStream};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub id: u64,
    pub duration_secs: u64,
    pub created_at: DateTime<Local>,
}

pub struct Recorder {
    provider: Arc<dyn CaptureProvider>,
    stream: Option<CaptureStream>,
    started_at: Option<Instant>,
    recordings: Vec<Recording>,
    playing: Option<u64>,
    next_id: u64,
}

impl Recorder {
    pub fn new(provider: Arc<dyn CaptureProvider>) -> Self {
        Recorder {
            provider,
            stream: None,
            started_at: None,
            recordings: Vec::new(),
            playing: None,
            next_id: 0,
        }
    }

    pub fn provider(&self) -> Arc<dyn CaptureProvider> {
        Arc::clone(&self.provider)
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// Start recording on an already acquired audio stream.
    pub fn begin(&mut self, stream: CaptureStream) -> Result<(), CapabilityError> {
        if !stream.has_audio() {
            self.provider.release(stream);
            return Err(CapabilityError::DeviceError(
                "stream has no audio track".to_string(),
            ));
        }
        if let Some(previous) = self.stream.replace(stream) {
            self.provider.release(previous);
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Stop and keep the take. `None` if nothing was recording.
    pub fn stop(&mut self) -> Option<Recording> {
        let stream = self.stream.take()?;
        let duration_secs = self.elapsed_secs();
        self.started_at = None;
        self.provider.release(stream);

        self.next_id += 1;
        let recording = Recording {
            id: self.next_id,
            duration_secs,
            created_at: Local::now(),
        };
        self.recordings.push(recording.clone());
        log::info!("[Recorder] saved recording {} ({}s)", recording.id, duration_secs);
        Some(recording)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started_at
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Input level for the meter, 0..=100. Zero while idle.
    pub fn level(&self) -> f32 {
        match &self.stream {
            Some(stream) => self
                .provider
                .audio_level(stream)
                .map(|l| (l * 150.0).clamp(0.0, 100.0))
                .unwrap_or(0.0),
            None => 0.0,
        }
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn playing(&self) -> Option<u64> {
        self.playing
    }

    /// Play `id`, or stop it if it is the one playing.
    pub fn toggle_play(&mut self, id: u64) {
        if self.playing == Some(id) {
            self.playing = None;
        } else if self.recordings.iter().any(|r| r.id == id) {
            self.playing = Some(id);
        }
    }

    pub fn delete(&mut self, id: u64) {
        if self.playing == Some(id) {
            self.playing = None;
        }
        self.recordings.retain(|r| r.id != id);
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.provider.release(stream);
        }
    }
}

/// `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::capture::{CaptureConstraints, SimulatedCapture};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_record_stop_keeps_duration() {
        let mic = Arc::new(SimulatedCapture::new());
        let mut recorder = Recorder::new(mic.clone());

        let stream = mic.acquire(CaptureConstraints::microphone()).await.unwrap();
        recorder.begin(stream).unwrap();
        assert!(recorder.is_recording());

        tokio::time::advance(Duration::from_secs(7)).await;
        let take = recorder.stop().unwrap();
        assert_eq!(take.duration_secs, 7);
        assert_eq!(mic.active_streams(), 0);
        assert_eq!(recorder.level(), 0.0);
    }

    #[tokio::test]
    async fn test_video_only_stream_rejected() {
        let cam = Arc::new(SimulatedCapture::new());
        let mut recorder = Recorder::new(cam.clone());
        let stream = cam.acquire(CaptureConstraints::camera()).await.unwrap();
        assert!(recorder.begin(stream).is_err());
        assert_eq!(cam.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_play_and_delete() {
        let mic = Arc::new(SimulatedCapture::new());
        let mut recorder = Recorder::new(mic.clone());
        let stream = mic.acquire(CaptureConstraints::microphone()).await.unwrap();
        recorder.begin(stream).unwrap();
        let take = recorder.stop().unwrap();

        recorder.toggle_play(take.id);
        assert_eq!(recorder.playing(), Some(take.id));
        recorder.delete(take.id);
        assert_eq!(recorder.playing(), None);
        assert!(recorder.recordings().is_empty());
        assert!(recorder.stop().is_none());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(65), "1:05");
    }
}
