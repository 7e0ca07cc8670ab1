//! Simulated device state store.
//!
//! `DeviceStore` owns every simulated device attribute (battery, radios,
//! storage, RAM, running processes) and is the single source of truth for
//! device data. Every mutation replaces the affected sub-record as a whole,
//! so a snapshot taken under a read guard is always consistent.

pub mod battery;
pub mod capture;
pub mod network;
pub mod ram;

pub use battery::{BatteryProvider, BatteryReading, NoBattery, ReportedBattery, SysfsBattery};
pub use capture::{CaptureConstraints, CaptureProvider, CaptureStream, SimulatedCapture, UnavailableCapture};
pub use network::{CellularState, WifiNetwork, WifiState};
pub use ram::RunningApp;

use crate::config::PhoneSettings;
use crate::error::PhoneError;
use crate::models::AppId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Used/total pair in gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageGb {
    pub used_gb: f32,
    pub total_gb: f32,
}

impl UsageGb {
    pub fn new(used_gb: f32, total_gb: f32) -> Self {
        UsageGb { used_gb, total_gb }
    }

    pub fn free_gb(&self) -> f32 {
        (self.total_gb - self.used_gb).max(0.0)
    }

    pub fn percent(&self) -> f32 {
        if self.total_gb <= 0.0 {
            return 0.0;
        }
        (self.used_gb / self.total_gb * 100.0).clamp(0.0, 100.0)
    }
}

/// Everything the phone knows about its own hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// 0.0..=100.0
    pub battery_level: f32,
    pub is_charging: bool,
    pub wifi: WifiState,
    pub cellular: CellularState,
    pub storage: UsageGb,
    pub ram: UsageGb,
    pub running_apps: Vec<RunningApp>,
}

impl DeviceState {
    pub fn new(settings: &PhoneSettings) -> Self {
        DeviceState {
            battery_level: battery::clamp_level(settings.initial_battery_level),
            is_charging: false,
            wifi: WifiState::connected_to(&default_network(settings)),
            cellular: CellularState::new(true, 4),
            storage: UsageGb::new(28.0, 64.0),
            ram: UsageGb::new(3.2, 8.0),
            running_apps: ram::default_running_apps(),
        }
    }

    pub fn battery_percentage(&self) -> u8 {
        battery::clamp_level(self.battery_level).floor() as u8
    }

    pub fn battery_estimate_hours(&self) -> u32 {
        battery::estimate_hours(self.battery_percentage(), self.is_charging)
    }

    pub fn ram_percent(&self) -> f32 {
        self.ram.percent()
    }

    pub fn storage_percent(&self) -> f32 {
        self.storage.percent()
    }

    /// Sum of the per-process RAM figures.
    pub fn running_apps_ram(&self) -> f32 {
        self.running_apps.iter().map(|a| a.ram_gb).sum()
    }

    /// Difference between the aggregate RAM figure and the per-process sum.
    ///
    /// The aggregate is moved by jitter and by app accounting independently,
    /// so this is generally non-zero.
    pub fn ram_drift(&self) -> f32 {
        self.ram.used_gb - self.running_apps_ram()
    }
}

fn default_network(settings: &PhoneSettings) -> WifiNetwork {
    WifiNetwork::new(
        settings.wifi_ssid.clone(),
        settings.wifi_ip.clone(),
        settings.wifi_signal,
    )
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Limits the store enforces, captured from settings at construction.
#[derive(Debug, Clone)]
struct StoreLimits {
    jitter_min_gb: f32,
    jitter_max_gb: f32,
    jitter_step_gb: f32,
    min_resident_gb: f32,
    default_network: WifiNetwork,
}

/// Owner of `DeviceState` and the only place it is mutated.
#[derive(Debug, Clone)]
pub struct DeviceStore {
    state: DeviceState,
    limits: StoreLimits,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new(&PhoneSettings::default())
    }
}

impl DeviceStore {
    pub fn new(settings: &PhoneSettings) -> Self {
        DeviceStore {
            state: DeviceState::new(settings),
            limits: StoreLimits {
                jitter_min_gb: settings.ram_jitter_min_gb,
                jitter_max_gb: settings.ram_jitter_max_gb,
                jitter_step_gb: settings.ram_jitter_step_gb,
                min_resident_gb: settings.min_resident_ram_gb,
                default_network: default_network(settings),
            },
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn snapshot(&self) -> DeviceState {
        self.state.clone()
    }

    /// Flip (`None`) or set the Wi-Fi connection.
    ///
    /// Connecting takes ssid/signal/ip from `network` or the default network.
    pub fn toggle_wifi(&mut self, connect: Option<bool>, network: Option<WifiNetwork>) {
        let connect = connect.unwrap_or(!self.state.wifi.connected);
        self.state.wifi = if connect {
            let network = network.unwrap_or_else(|| self.limits.default_network.clone());
            WifiState::connected_to(&network)
        } else {
            WifiState::disconnected()
        };
        log::debug!(
            "[Device] Wi-Fi {} ({:?})",
            if connect { "on" } else { "off" },
            self.state.wifi.ssid
        );
    }

    /// Flip the cellular connection flag. Strength is untouched.
    pub fn toggle_cellular(&mut self) {
        let current = &self.state.cellular;
        self.state.cellular = CellularState {
            connected: !current.connected,
            ..current.clone()
        };
    }

    pub fn set_charging(&mut self, charging: bool) {
        self.state.is_charging = charging;
    }

    /// One simulated battery step.
    pub fn battery_tick(&mut self) {
        self.state.battery_level = battery::simulated_step(self.state.battery_level, self.state.is_charging);
    }

    /// Overwrite battery fields with a real reading.
    pub fn apply_battery_reading(&mut self, reading: BatteryReading) {
        self.state.battery_level = battery::level_from_reading(&reading);
        self.state.is_charging = reading.charging;
    }

    /// One RAM fluctuation step.
    pub fn ram_jitter_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let delta = ram::random_delta(rng, self.limits.jitter_step_gb);
        self.apply_ram_delta(delta);
    }

    /// Apply a jitter delta, clamped to the jitter band and rounded.
    pub fn apply_ram_delta(&mut self, delta: f32) {
        let ram = self.state.ram;
        let used = ram::jittered(
            ram.used_gb,
            finite_or_zero(delta),
            self.limits.jitter_min_gb,
            self.limits.jitter_max_gb,
            ram.total_gb,
        );
        self.state.ram = UsageGb::new(used, ram.total_gb);
    }

    /// Charge the app's RAM cost, capped at total.
    pub fn on_app_opened(&mut self, app: AppId) {
        let ram = self.state.ram;
        let used = (finite_or_zero(ram.used_gb) + ram::app_ram_cost(app)).clamp(0.0, ram.total_gb);
        self.state.ram = UsageGb::new(used, ram.total_gb);
    }

    /// Terminate a running process and return the RAM it released.
    ///
    /// The system process and names that are not running are refused
    /// without touching the state.
    pub fn terminate_app(&mut self, name: &str) -> Result<f32, PhoneError> {
        if name == ram::SYSTEM_APP {
            return Err(PhoneError::InvalidOperation(
                "No se puede cerrar el proceso del Sistema".to_string(),
            ));
        }

        let position = self
            .state
            .running_apps
            .iter()
            .position(|app| app.name == name)
            .ok_or_else(|| {
                PhoneError::InvalidOperation(format!("La aplicación {} no está en ejecución", name))
            })?;

        let mut apps = self.state.running_apps.clone();
        let removed = apps.remove(position);
        let released = finite_or_zero(removed.ram_gb).max(0.0);

        let ram = self.state.ram;
        let floor = self.limits.min_resident_gb.min(ram.total_gb);
        let used = (ram.used_gb - released).max(floor);

        self.state.running_apps = apps;
        self.state.ram = UsageGb::new(used, ram.total_gb);
        log::info!("[Device] Terminated {} ({:.1} GB released)", name, released);
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let store = DeviceStore::default();
        let s = store.state();
        assert_eq!(s.battery_level, 85.0);
        assert!(s.wifi.connected);
        assert_eq!(s.wifi.ssid.as_deref(), Some("Red Hogar"));
        assert_eq!(s.cellular.strength, 4);
        assert_eq!(s.ram.used_gb, 3.2);
        assert_eq!(s.running_apps.len(), 5);
    }

    #[test]
    fn test_toggle_wifi_off_and_on() {
        let mut store = DeviceStore::default();
        store.toggle_wifi(None, None);
        assert_eq!(store.state().wifi, WifiState::disconnected());

        store.toggle_wifi(Some(true), Some(WifiNetwork::new("Oficina", "10.0.0.7", 60)));
        let wifi = &store.state().wifi;
        assert!(wifi.connected);
        assert_eq!(wifi.ssid.as_deref(), Some("Oficina"));
        assert_eq!(wifi.ip, "10.0.0.7");
        assert_eq!(wifi.signal_strength, 60);
    }

    #[test]
    fn test_toggle_cellular_keeps_strength() {
        let mut store = DeviceStore::default();
        store.toggle_cellular();
        assert!(!store.state().cellular.connected);
        assert_eq!(store.state().cellular.strength, 4);
    }

    #[test]
    fn test_battery_reading_overrides_simulation() {
        let mut store = DeviceStore::default();
        store.apply_battery_reading(BatteryReading {
            level: 0.423,
            charging: true,
        });
        assert_eq!(store.state().battery_level, 42.0);
        assert!(store.state().is_charging);
    }

    #[test]
    fn test_terminate_system_refused() {
        let mut store = DeviceStore::default();
        let before = store.snapshot();
        assert!(store.terminate_app("Sistema").is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_terminate_unknown_refused() {
        let mut store = DeviceStore::default();
        let before = store.snapshot();
        assert!(matches!(
            store.terminate_app("Navegador"),
            Err(PhoneError::InvalidOperation(_))
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_terminate_releases_ram() {
        let mut store = DeviceStore::default();
        let released = store.terminate_app("Cámara").unwrap();
        assert_eq!(released, 0.8);
        assert!((store.state().ram.used_gb - 2.4).abs() < 1e-5);
        assert_eq!(store.state().running_apps.len(), 4);
    }

    #[test]
    fn test_terminate_respects_resident_floor() {
        let mut store = DeviceStore::default();
        store.apply_ram_delta(-10.0);
        assert_eq!(store.state().ram.used_gb, 2.8);
        store.terminate_app("Cámara").unwrap();
        store.terminate_app("Galería").unwrap();
        store.terminate_app("Teléfono").unwrap();
        assert!(store.state().ram.used_gb >= 1.5);
    }

    #[test]
    fn test_app_open_is_capped_at_total() {
        let mut store = DeviceStore::default();
        for _ in 0..10 {
            store.on_app_opened(AppId::Game);
        }
        assert_eq!(store.state().ram.used_gb, 8.0);
    }

    #[test]
    fn test_ram_drift_is_observable() {
        let store = DeviceStore::default();
        // 3.2 aggregate against 3.2 in the process list at boot
        assert!(store.state().ram_drift().abs() < 1e-5);

        let mut store = store;
        store.on_app_opened(AppId::Calculator);
        assert!((store.state().ram_drift() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut store = DeviceStore::default();
        store.apply_ram_delta(f32::NAN);
        assert_eq!(store.state().ram.used_gb, 3.2);
    }
}
