//! Configuration module for the phone simulator.
//!
//! # Module Structure
//!
//! - `validator`: Validates settings parameters and detects conflicts
//! - `storage`: Local key/value storage for the few persisted scalars
//!
//! # Settings Management
//!
//! The `SettingsManager` provides thread-safe access to `PhoneSettings`:
//! - Uses `Arc<RwLock<PhoneSettings>>` for parallel reads
//! - Persists settings to `config/settings.json`
//! - Falls back to defaults when the file is missing or malformed

pub mod storage;
pub mod validator;

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Default relative path of the settings file.
pub const SETTINGS_PATH: &str = "config/settings.json";

/// Reference unlock pattern: an "L" drawn on the 3x3 grid.
pub const DEFAULT_LOCK_PATTERN: [u8; 5] = [0, 3, 6, 7, 8];

/// Tunables of the simulated device.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhoneSettings {
    // Periodic tasks
    pub battery_tick_ms: u64,
    pub ram_jitter_ms: u64,
    pub clock_tick_ms: u64,

    // Power state machine delays
    pub power_off_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub restart_dark_ms: u64,

    // Unlock gesture
    pub lock_pattern: Vec<u8>,
    pub unlock_confirm_ms: u64,
    pub unlock_reset_ms: u64,

    // Device model
    pub initial_battery_level: f32,
    pub ram_jitter_min_gb: f32,
    pub ram_jitter_max_gb: f32,
    pub ram_jitter_step_gb: f32,
    pub min_resident_ram_gb: f32,
    pub recents_limit: usize,

    // Default Wi-Fi network joined when toggling Wi-Fi on
    pub wifi_ssid: String,
    pub wifi_ip: String,
    pub wifi_signal: u8,

    // Debug Settings
    pub debug_logging: bool,
}

impl Default for PhoneSettings {
    fn default() -> Self {
        PhoneSettings {
            battery_tick_ms: 10_000,
            ram_jitter_ms: 5_000,
            clock_tick_ms: 1_000,
            power_off_delay_ms: 2_000,
            restart_delay_ms: 2_000,
            restart_dark_ms: 3_000,
            lock_pattern: DEFAULT_LOCK_PATTERN.to_vec(),
            unlock_confirm_ms: 500,
            unlock_reset_ms: 1_000,
            initial_battery_level: 85.0,
            ram_jitter_min_gb: 2.8,
            ram_jitter_max_gb: 4.2,
            ram_jitter_step_gb: 0.15,
            min_resident_ram_gb: 1.5,
            recents_limit: 5,
            wifi_ssid: "Red Hogar".to_string(),
            wifi_ip: "192.168.1.5".to_string(),
            wifi_signal: 85,
            debug_logging: false,
        }
    }
}

impl PhoneSettings {
    pub fn battery_tick(&self) -> Duration {
        Duration::from_millis(self.battery_tick_ms)
    }

    pub fn ram_jitter_period(&self) -> Duration {
        Duration::from_millis(self.ram_jitter_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn power_off_delay(&self) -> Duration {
        Duration::from_millis(self.power_off_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn restart_dark(&self) -> Duration {
        Duration::from_millis(self.restart_dark_ms)
    }

    pub fn unlock_confirm(&self) -> Duration {
        Duration::from_millis(self.unlock_confirm_ms)
    }

    pub fn unlock_reset(&self) -> Duration {
        Duration::from_millis(self.unlock_reset_ms)
    }

    /// Short human-readable summary for startup logs.
    pub fn get_summary(&self) -> String {
        format!(
            "Settings Summary:\n  Battery tick: {}ms\n  RAM jitter: {}ms [{:.1}-{:.1} GB]\n  Pattern length: {}\n  Recents: {}",
            self.battery_tick_ms,
            self.ram_jitter_ms,
            self.ram_jitter_min_gb,
            self.ram_jitter_max_gb,
            self.lock_pattern.len(),
            self.recents_limit
        )
    }
}

/// Thread-safe settings manager for PhoneSettings persistence
pub struct SettingsManager;

impl SettingsManager {
    /// Load settings from `config/settings.json`, or defaults if it doesn't exist.
    pub fn load() -> Result<PhoneSettings, ConfigError> {
        Self::load_from(Path::new(SETTINGS_PATH))
    }

    /// Load settings from an explicit path.
    ///
    /// A missing or malformed file falls back to defaults; a file that
    /// exists but cannot be read is an error. Individually invalid values
    /// (bad lock pattern, inverted RAM band, zero periods) are reset to their
    /// defaults with a warning instead of failing the whole load.
    pub fn load_from(path: &Path) -> Result<PhoneSettings, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PhoneSettings::default())
            }
            Err(e) => return Err(ConfigError::IoError(e)),
        };

        match serde_json::from_str::<PhoneSettings>(&content) {
            Ok(settings) => Ok(validator::sanitize(settings)),
            Err(e) => {
                log::warn!(
                    "[Config] Failed to parse {}, falling back to defaults: {}",
                    path.display(),
                    e
                );
                Ok(PhoneSettings::default())
            }
        }
    }

    /// Save settings to `config/settings.json`
    pub fn save(settings: &PhoneSettings) -> Result<(), ConfigError> {
        Self::save_to(settings, Path::new(SETTINGS_PATH))
    }

    /// Save settings to an explicit path, creating parent directories.
    pub fn save_to(settings: &PhoneSettings, path: &Path) -> Result<(), ConfigError> {
        validator::validate_settings(settings)?;

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(ConfigError::IoError)?;
            }
        }

        let content = serde_json::to_string_pretty(settings).map_err(ConfigError::InvalidJson)?;
        std::fs::write(path, content).map_err(ConfigError::IoError)?;
        Ok(())
    }

    /// Create a thread-safe shared instance of PhoneSettings
    pub fn new_shared() -> Result<Arc<RwLock<PhoneSettings>>, ConfigError> {
        let settings = Self::load()?;
        Ok(Arc::new(RwLock::new(settings)))
    }

    /// Path of the settings file relative to the working directory.
    pub fn settings_path() -> PathBuf {
        PathBuf::from(SETTINGS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_device_model() {
        let settings = PhoneSettings::default();
        assert_eq!(settings.lock_pattern, vec![0, 3, 6, 7, 8]);
        assert_eq!(settings.battery_tick(), Duration::from_secs(10));
        assert_eq!(settings.ram_jitter_period(), Duration::from_secs(5));
        assert_eq!(settings.power_off_delay(), Duration::from_secs(2));
        assert_eq!(settings.restart_dark(), Duration::from_secs(3));
        assert_eq!(settings.recents_limit, 5);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = SettingsManager::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, PhoneSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "battery_tick_ms": 250 }"#).unwrap();

        let settings = SettingsManager::load_from(&path).unwrap();
        assert_eq!(settings.battery_tick_ms, 250);
        assert_eq!(settings.ram_jitter_ms, 5_000);
    }

    #[test]
    fn test_get_summary() {
        let summary = PhoneSettings::default().get_summary();
        assert!(summary.contains("10000ms"));
        assert!(summary.contains("2.8-4.2"));
    }
}
