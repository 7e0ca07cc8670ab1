//! Unified error type hierarchy for Pocket Phone
//!
//! Provides structured error handling with CapabilityError, PhoneError,
//! ConfigError and AppError.

use std::io;
use thiserror::Error;

/// Failures reported by device capability providers (camera, microphone, battery).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Capability not supported on this device")]
    NotSupported,

    #[error("Permission denied by the user")]
    PermissionDenied,

    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Errors raised by phone operations that refuse to mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Capability failure: {0}")]
    Capability(#[from] CapabilityError),
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Global error type for user-facing failures.
///
/// Every variant maps to a message suitable for a transient notice.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// A phone operation was refused
    #[error("Phone error: {0}")]
    Phone(#[from] PhoneError),

    /// Settings persist or deserialize error
    #[error("Settings error: {0}")]
    Settings(String),
}

impl AppError {
    /// Get a user-facing error message suitable for UI display
    pub fn user_message(&self) -> String {
        match self {
            AppError::Phone(PhoneError::InvalidOperation(msg)) => msg.clone(),
            AppError::Phone(PhoneError::Capability(cap)) => capability_message(cap),
            AppError::Settings(msg) => format!("Error de configuración: {}", msg),
        }
    }
}

/// Text shown to the user when a capability cannot be used.
pub fn capability_message(err: &CapabilityError) -> String {
    match err {
        CapabilityError::NotSupported => "API de dispositivos multimedia no soportada".to_string(),
        CapabilityError::PermissionDenied => "Permiso denegado para acceder al dispositivo".to_string(),
        CapabilityError::DeviceError(msg) => format!("Error del dispositivo: {}", msg),
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Settings(e.to_string())
    }
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_display() {
        let err = CapabilityError::DeviceError("sensor busy".to_string());
        assert_eq!(err.to_string(), "Device error: sensor busy");
    }

    #[test]
    fn test_phone_error_from_capability() {
        let err: PhoneError = CapabilityError::PermissionDenied.into();
        assert_eq!(err, PhoneError::Capability(CapabilityError::PermissionDenied));
    }

    #[test]
    fn test_user_message_for_invalid_operation() {
        let err = AppError::from(PhoneError::InvalidOperation(
            "No se puede cerrar el Sistema".to_string(),
        ));
        assert_eq!(err.user_message(), "No se puede cerrar el Sistema");
    }

    #[test]
    fn test_config_error_user_message() {
        let err = ConfigError::ValidationFailed("lock pattern repeats point 3".to_string());
        assert_eq!(
            AppError::from(err).user_message(),
            "Error de configuración: Configuration validation failed: lock pattern repeats point 3"
        );
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err("test error".into());
        assert!(result.is_err());
    }
}
