//! Camera session: owns at most one video stream.
//!
//! The session listens for `CameraForceShutdown` for its whole lifetime and
//! releases the stream when it arrives. Captured frames are published as
//! `PhotoCaptured`; the session never touches the gallery itself.

use crate::error::{CapabilityError, PhoneError};
use crate::events::{EventBus, EventKind, PhoneEvent, Subscription};
use crate::hardware::capture::{CaptureConstraints, CaptureProvider, CaptureStream};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Slot {
    stream: Option<CaptureStream>,
    /// Bumped on every stop so an acquisition that resolves late can tell
    /// it was cancelled.
    generation: u64,
    last_error: Option<CapabilityError>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|p| p.into_inner())
}

fn release(provider: &dyn CaptureProvider, slot: &Mutex<Slot>) {
    let stream = {
        let mut slot = lock(slot);
        slot.generation += 1;
        slot.stream.take()
    };
    if let Some(stream) = stream {
        log::info!("[Camera] releasing stream {}", stream.id);
        provider.release(stream);
    }
}

pub struct CameraSession {
    provider: Arc<dyn CaptureProvider>,
    bus: EventBus,
    slot: Arc<Mutex<Slot>>,
    _shutdown: Subscription,
}

impl CameraSession {
    pub fn new(provider: Arc<dyn CaptureProvider>, bus: EventBus) -> Self {
        let slot = Arc::new(Mutex::new(Slot::default()));

        let handler_provider = Arc::clone(&provider);
        let handler_slot = Arc::clone(&slot);
        let shutdown = bus.subscribe(EventKind::CameraForceShutdown, move |_| {
            release(handler_provider.as_ref(), &handler_slot);
        });

        CameraSession {
            provider,
            bus,
            slot,
            _shutdown: shutdown,
        }
    }

    /// Acquire the front camera, replacing any stream already held.
    pub async fn start(&self) -> Result<(), CapabilityError> {
        let generation = self.prepare();
        self.start_prepared(generation).await
    }

    /// Drop any held stream and return the generation a following
    /// `start_prepared` must still match when its acquisition resolves.
    pub fn prepare(&self) -> u64 {
        self.stop();
        lock(&self.slot).generation
    }

    /// Finish a start begun with `prepare`. A stop or force shutdown in
    /// between wins: the late stream is released and nothing is reported.
    pub async fn start_prepared(&self, generation: u64) -> Result<(), CapabilityError> {
        let result = self.provider.acquire(CaptureConstraints::camera()).await;

        let mut slot = lock(&self.slot);
        if slot.generation != generation {
            drop(slot);
            log::debug!("[Camera] acquisition finished after stop, discarding");
            if let Ok(stream) = result {
                self.provider.release(stream);
            }
            return Ok(());
        }

        match result {
            Ok(stream) => {
                slot.last_error = None;
                slot.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                log::warn!("[Camera] could not start: {}", e);
                slot.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn stop(&self) {
        release(self.provider.as_ref(), &self.slot);
    }

    pub fn is_active(&self) -> bool {
        lock(&self.slot).stream.is_some()
    }

    pub fn last_error(&self) -> Option<CapabilityError> {
        lock(&self.slot).last_error.clone()
    }

    /// Capture a frame and publish it. Refused while no stream is held.
    pub fn take_photo(&self) -> Result<String, PhoneError> {
        let photo = {
            let slot = lock(&self.slot);
            let stream = slot.stream.as_ref().ok_or_else(|| {
                PhoneError::InvalidOperation(
                    "Cámara no lista: espera a que la cámara esté activa".to_string(),
                )
            })?;
            self.provider.capture(stream)?
        };

        self.bus.publish(PhoneEvent::PhotoCaptured {
            photo_url: photo.clone(),
        });
        Ok(photo)
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}
