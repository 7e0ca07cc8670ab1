//! Pocket Phone
//!
//! A smartphone OS simulator: a simulated device (battery, radios, RAM and
//! storage), a navigation and power lifecycle controller, a typed event bus
//! for camera capture, and a screen router, fronted by an egui phone frame.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: App ids, recents entries and notices
//! - **hardware**: Device state store and capability providers
//! - **lifecycle**: Navigation, power state machine, unlock gesture, gallery
//! - **events**: Typed publish/subscribe bus
//! - **apps**: Models behind the individual app screens
//! - **config**: Settings and local key/value storage
//! - **system**: Logger installation and logging macros
//! - **ui**: PhoneController, router and the egui frontend

// Core foundational modules
pub mod error;
pub mod models;

// Simulated device and capability providers
pub mod hardware;

// Navigation and power lifecycle
pub mod lifecycle;

// Typed event bus
pub mod events;

// App models
pub mod apps;

// Logger installation and logging macros
pub mod system;

// Settings and key/value storage
pub mod config;

// PhoneController and egui integration
pub mod ui;

// Decoupled logging pipeline
pub mod log_collector;

// Re-export the log crate for macro usage
pub use log;

pub use system::initialize_logging;
pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AppError, CapabilityError, ConfigError, PhoneError, Result};
pub use models::{AppId, Notice, NoticeLevel, RecentApp};
pub use hardware::{DeviceState, DeviceStore};
pub use lifecycle::{NavigationState, Navigator, PhoneMode, PowerState};
pub use events::{EventBus, EventKind, PhoneEvent, Subscription};
pub use config::{PhoneSettings, SettingsManager};
pub use ui::{PhoneController, Providers, ScreenId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
        let err = PhoneError::InvalidOperation("x".into());
        assert_eq!(AppError::from(err).user_message(), "x");
    }

    #[test]
    fn test_models_reexport() {
        assert_eq!(AppId::from_id("camera"), Some(AppId::Camera));
        assert_eq!(PowerState::On, PowerState::On);
    }
}
