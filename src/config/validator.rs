//! Settings validation.
//!
//! `validate_settings` is strict and used before saving; `sanitize` is the
//! lenient variant applied on load, resetting each invalid value to its
//! default so a hand-edited file never prevents the phone from booting.

use super::{PhoneSettings, DEFAULT_LOCK_PATTERN};
use crate::error::ConfigError;

/// Number of points on the unlock grid.
pub const GRID_POINTS: u8 = 9;

/// Validate a lock pattern: non-empty, ids on the grid, no repeated point.
pub fn validate_pattern(pattern: &[u8]) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "lock pattern must not be empty".to_string(),
        ));
    }

    if let Some(bad) = pattern.iter().find(|p| **p >= GRID_POINTS) {
        return Err(ConfigError::ValidationFailed(format!(
            "lock pattern point {} is outside the 3x3 grid",
            bad
        )));
    }

    for (i, point) in pattern.iter().enumerate() {
        if pattern[..i].contains(point) {
            return Err(ConfigError::ValidationFailed(format!(
                "lock pattern repeats point {}",
                point
            )));
        }
    }

    Ok(())
}

/// Validate the full settings record.
pub fn validate_settings(settings: &PhoneSettings) -> Result<(), ConfigError> {
    validate_pattern(&settings.lock_pattern)?;

    if settings.ram_jitter_min_gb > settings.ram_jitter_max_gb {
        return Err(ConfigError::ValidationFailed(format!(
            "RAM jitter band is inverted: {} > {}",
            settings.ram_jitter_min_gb, settings.ram_jitter_max_gb
        )));
    }

    let periods = [
        ("battery_tick_ms", settings.battery_tick_ms),
        ("ram_jitter_ms", settings.ram_jitter_ms),
        ("clock_tick_ms", settings.clock_tick_ms),
    ];
    if let Some((name, _)) = periods.iter().find(|(_, ms)| *ms == 0) {
        return Err(ConfigError::ValidationFailed(format!(
            "{} must be greater than zero",
            name
        )));
    }

    if settings.recents_limit == 0 {
        return Err(ConfigError::ValidationFailed(
            "recents_limit must be greater than zero".to_string(),
        ));
    }

    if settings.wifi_signal > 100 {
        return Err(ConfigError::ValidationFailed(format!(
            "wifi_signal {} exceeds 100",
            settings.wifi_signal
        )));
    }

    Ok(())
}

/// Reset every invalid value to its default.
pub fn sanitize(mut settings: PhoneSettings) -> PhoneSettings {
    let defaults = PhoneSettings::default();

    if let Err(e) = validate_pattern(&settings.lock_pattern) {
        log::warn!("[Config] {}; resetting lock pattern to default", e);
        settings.lock_pattern = DEFAULT_LOCK_PATTERN.to_vec();
    }

    if settings.ram_jitter_min_gb > settings.ram_jitter_max_gb {
        log::warn!("[Config] RAM jitter band inverted; resetting to default band");
        settings.ram_jitter_min_gb = defaults.ram_jitter_min_gb;
        settings.ram_jitter_max_gb = defaults.ram_jitter_max_gb;
    }

    if settings.battery_tick_ms == 0 {
        settings.battery_tick_ms = defaults.battery_tick_ms;
    }
    if settings.ram_jitter_ms == 0 {
        settings.ram_jitter_ms = defaults.ram_jitter_ms;
    }
    if settings.clock_tick_ms == 0 {
        settings.clock_tick_ms = defaults.clock_tick_ms;
    }
    if settings.recents_limit == 0 {
        settings.recents_limit = defaults.recents_limit;
    }

    settings.wifi_signal = settings.wifi_signal.min(100);
    settings.initial_battery_level = if settings.initial_battery_level.is_finite() {
        settings.initial_battery_level.clamp(0.0, 100.0)
    } else {
        defaults.initial_battery_level
    };

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&PhoneSettings::default()).is_ok());
    }

    #[test]
    fn test_pattern_rejects_repeats_and_off_grid() {
        assert!(validate_pattern(&[0, 3, 3]).is_err());
        assert!(validate_pattern(&[0, 9]).is_err());
        assert!(validate_pattern(&[]).is_err());
        assert!(validate_pattern(&[4]).is_ok());
    }

    #[test]
    fn test_sanitize_resets_bad_values() {
        let settings = PhoneSettings {
            lock_pattern: vec![1, 1],
            ram_jitter_min_gb: 5.0,
            ram_jitter_max_gb: 1.0,
            battery_tick_ms: 0,
            initial_battery_level: 140.0,
            ..PhoneSettings::default()
        };

        let clean = sanitize(settings);
        assert_eq!(clean.lock_pattern, DEFAULT_LOCK_PATTERN.to_vec());
        assert_eq!(clean.ram_jitter_min_gb, 2.8);
        assert_eq!(clean.ram_jitter_max_gb, 4.2);
        assert_eq!(clean.battery_tick_ms, 10_000);
        assert_eq!(clean.initial_battery_level, 100.0);
        assert!(validate_settings(&clean).is_ok());
    }
}
