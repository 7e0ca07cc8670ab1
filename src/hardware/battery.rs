//! Battery model and battery capability providers.
//!
//! The simulated model steps the level on a fixed tick. When a provider
//! reports real readings, those replace the simulation entirely: the
//! controller does not schedule the simulated tick while a provider feed is
//! attached.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;

/// Level gained per simulated tick while charging.
pub const CHARGE_STEP: f32 = 1.0;
/// Level lost per simulated tick while discharging.
pub const DRAIN_STEP: f32 = 0.1;

/// A reading pushed by a battery capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReading {
    /// 0.0..=1.0
    pub level: f32,
    pub charging: bool,
}

/// One simulated tick: charging moves toward 100, otherwise toward 0.
pub fn simulated_step(level: f32, charging: bool) -> f32 {
    let level = clamp_level(level);
    if charging {
        (level + CHARGE_STEP).min(100.0)
    } else {
        (level - DRAIN_STEP).max(0.0)
    }
}

/// Percentage from a device reading (floored, clamped).
pub fn level_from_reading(reading: &BatteryReading) -> f32 {
    if !reading.level.is_finite() {
        return 0.0;
    }
    (reading.level * 100.0).floor().clamp(0.0, 100.0)
}

pub fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Rough hours until full (charging) or empty (discharging).
pub fn estimate_hours(percentage: u8, charging: bool) -> u32 {
    let pct = percentage.min(100) as f32;
    if charging {
        ((100.0 - pct) / 25.0).round() as u32
    } else {
        (pct / 10.0).round() as u32
    }
}

/// Source of real battery readings.
pub trait BatteryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Start the feed. `None` means no real signal is available and the
    /// simulation should run instead.
    fn subscribe(&self) -> Option<watch::Receiver<BatteryReading>>;
}

/// Provider for devices without a battery capability.
pub struct NoBattery;

impl BatteryProvider for NoBattery {
    fn name(&self) -> &str {
        "simulated"
    }

    fn subscribe(&self) -> Option<watch::Receiver<BatteryReading>> {
        None
    }
}

/// Provider fed by hand, used by tests and embedders pushing their own signal.
pub struct ReportedBattery {
    tx: watch::Sender<BatteryReading>,
}

impl ReportedBattery {
    pub fn new(initial: BatteryReading) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ReportedBattery { tx }
    }

    pub fn report(&self, reading: BatteryReading) {
        self.tx.send_replace(reading);
    }
}

impl BatteryProvider for ReportedBattery {
    fn name(&self) -> &str {
        "reported"
    }

    fn subscribe(&self) -> Option<watch::Receiver<BatteryReading>> {
        Some(self.tx.subscribe())
    }
}

/// Battery exposed by the host through `/sys/class/power_supply/BAT*`.
pub struct SysfsBattery {
    dir: PathBuf,
    poll_interval: Duration,
}

impl SysfsBattery {
    /// Find the first battery under `/sys/class/power_supply`.
    pub fn detect() -> Option<Self> {
        Self::detect_in(Path::new("/sys/class/power_supply"))
    }

    pub fn detect_in(root: &Path) -> Option<Self> {
        let entries = fs::read_dir(root).ok()?;
        let mut batteries: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("BAT"))
            })
            .filter(|p| p.join("capacity").exists())
            .collect();
        batteries.sort();
        batteries.into_iter().next().map(|dir| SysfsBattery {
            dir,
            poll_interval: Duration::from_secs(30),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Read the current state. Returns `None` if the files are unreadable.
    pub fn read(&self) -> Option<BatteryReading> {
        read_sysfs_battery(&self.dir)
    }
}

/// Parse `capacity` (0-100) and `status` from a power-supply directory.
pub fn read_sysfs_battery(dir: &Path) -> Option<BatteryReading> {
    let capacity: f32 = fs::read_to_string(dir.join("capacity"))
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let status = fs::read_to_string(dir.join("status")).unwrap_or_default();
    let charging = matches!(status.trim(), "Charging" | "Full");

    Some(BatteryReading {
        level: (capacity / 100.0).clamp(0.0, 1.0),
        charging,
    })
}

impl BatteryProvider for SysfsBattery {
    fn name(&self) -> &str {
        "sysfs"
    }

    /// Must be called from within a tokio runtime: the poller is a spawned task
    /// that ends once every receiver is dropped.
    fn subscribe(&self) -> Option<watch::Receiver<BatteryReading>> {
        let first = self.read()?;
        let (tx, rx) = watch::channel(first);
        let dir = self.dir.clone();
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                if let Some(reading) = read_sysfs_battery(&dir) {
                    tx.send_if_modified(|current| {
                        if *current != reading {
                            *current = reading;
                            true
                        } else {
                            false
                        }
                    });
                }
            }
            log::debug!("[Battery] sysfs poller for {} stopped", dir.display());
        });

        Some(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_step_direction() {
        assert_eq!(simulated_step(50.0, true), 51.0);
        assert!((simulated_step(50.0, false) - 49.9).abs() < 1e-4);
        assert_eq!(simulated_step(99.5, true), 100.0);
        assert_eq!(simulated_step(0.05, false), 0.0);
    }

    #[test]
    fn test_level_from_reading_floors() {
        let reading = BatteryReading {
            level: 0.876,
            charging: false,
        };
        assert_eq!(level_from_reading(&reading), 87.0);
        let bogus = BatteryReading {
            level: 3.0,
            charging: true,
        };
        assert_eq!(level_from_reading(&bogus), 100.0);
    }

    #[test]
    fn test_estimate_hours() {
        assert_eq!(estimate_hours(80, false), 8);
        assert_eq!(estimate_hours(50, true), 2);
        assert_eq!(estimate_hours(100, true), 0);
    }

    #[test]
    fn test_sysfs_detection_and_read() {
        let root = tempfile::TempDir::new().unwrap();
        let bat = root.path().join("BAT0");
        fs::create_dir_all(&bat).unwrap();
        fs::write(bat.join("capacity"), "64\n").unwrap();
        fs::write(bat.join("status"), "Charging\n").unwrap();
        fs::create_dir_all(root.path().join("AC")).unwrap();

        let provider = SysfsBattery::detect_in(root.path()).expect("battery detected");
        let reading = provider.read().unwrap();
        assert!((reading.level - 0.64).abs() < 1e-6);
        assert!(reading.charging);
    }

    #[test]
    fn test_no_battery_has_no_feed() {
        assert!(NoBattery.subscribe().is_none());
    }

    #[test]
    fn test_reported_battery_feed() {
        let provider = ReportedBattery::new(BatteryReading {
            level: 0.5,
            charging: false,
        });
        let rx = provider.subscribe().unwrap();
        provider.report(BatteryReading {
            level: 0.7,
            charging: true,
        });
        assert!(rx.borrow().charging);
    }
}
