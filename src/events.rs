//! Typed publish/subscribe bus.
//!
//! Producers (camera) and consumers (gallery, camera shutdown) never hold
//! references to each other: they share a cloned `EventBus` handle.
//! Delivery is synchronous and in registration order; there is no replay.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Discriminant used to register handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    PhotoCaptured,
    CameraForceShutdown,
}

impl EventKind {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PhotoCaptured => "photo-captured",
            EventKind::CameraForceShutdown => "camera-force-shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneEvent {
    /// A frame was captured; `photo_url` is an image reference.
    PhotoCaptured { photo_url: String },
    /// Whoever holds a camera stream must release it now.
    CameraForceShutdown,
}

impl PhoneEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PhoneEvent::PhotoCaptured { .. } => EventKind::PhotoCaptured,
            PhoneEvent::CameraForceShutdown => EventKind::CameraForceShutdown,
        }
    }
}

type Handler = Arc<dyn Fn(&PhoneEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: BTreeMap<EventKind, Vec<(u64, Handler)>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cloneable handle to the shared handler registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. The handler stays registered until the
    /// returned `Subscription` is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&PhoneEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        log::debug!("[EventBus] +{} ({})", kind.as_str(), id);

        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Deliver `event` to every handler registered for its kind right now.
    ///
    /// Handlers run after the registry lock is released, so they may publish
    /// or subscribe themselves. Returns the number of handlers reached.
    pub fn publish(&self, event: PhoneEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = {
            let registry = lock(&self.registry);
            registry
                .handlers
                .get(&kind)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        lock(&self.registry)
            .handlers
            .get(&kind)
            .map_or(0, |list| list.len())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("photo_captured", &self.subscriber_count(EventKind::PhotoCaptured))
            .field(
                "camera_force_shutdown",
                &self.subscriber_count(EventKind::CameraForceShutdown),
            )
            .finish()
    }
}

/// Registration guard. Dropping it removes the handler.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(list) = registry.handlers.get_mut(&self.kind) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                registry.handlers.remove(&self.kind);
            }
        }
        log::debug!("[EventBus] -{} ({})", self.kind.as_str(), self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(PhoneEvent::CameraForceShutdown), 0);
    }

    #[test]
    fn test_handlers_receive_payload() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = bus.subscribe(EventKind::PhotoCaptured, move |event| {
            if let PhoneEvent::PhotoCaptured { photo_url } = event {
                sink.lock().unwrap().push(photo_url.clone());
            }
        });

        assert_eq!(
            bus.publish(PhoneEvent::PhotoCaptured {
                photo_url: "data:a".to_string()
            }),
            1
        );
        assert_eq!(bus.publish(PhoneEvent::CameraForceShutdown), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["data:a".to_string()]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sub = bus.subscribe(EventKind::CameraForceShutdown, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(PhoneEvent::CameraForceShutdown);
        drop(sub);
        bus.publish(PhoneEvent::CameraForceShutdown);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(EventKind::CameraForceShutdown), 0);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let bus = EventBus::new();
        bus.publish(PhoneEvent::PhotoCaptured {
            photo_url: "early".to_string(),
        });

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(EventKind::PhotoCaptured, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let _relay = bus.subscribe(EventKind::PhotoCaptured, move |_| {
            inner_bus.publish(PhoneEvent::CameraForceShutdown);
        });
        let counter = Arc::clone(&hits);
        let _sink = bus.subscribe(EventKind::CameraForceShutdown, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(PhoneEvent::PhotoCaptured {
            photo_url: "x".to_string(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe(EventKind::PhotoCaptured, |_| {});
        drop(bus);
        drop(sub);
    }
}
