//! Simulated radios: Wi-Fi and cellular.

use serde::{Deserialize, Serialize};

/// Sentinel ip reported while Wi-Fi is disconnected.
pub const UNKNOWN_IP: &str = "0.0.0.0";

/// Cellular strength scale bounds (bars).
pub const MIN_CELL_STRENGTH: u8 = 1;
pub const MAX_CELL_STRENGTH: u8 = 5;

/// Descriptor of a Wi-Fi network the phone can join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    pub ip: String,
    pub signal_strength: u8,
}

impl WifiNetwork {
    pub fn new(ssid: impl Into<String>, ip: impl Into<String>, signal_strength: u8) -> Self {
        WifiNetwork {
            ssid: ssid.into(),
            ip: ip.into(),
            signal_strength: signal_strength.min(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiState {
    pub connected: bool,
    /// 0..=100
    pub signal_strength: u8,
    pub ssid: Option<String>,
    pub ip: String,
}

impl WifiState {
    pub fn connected_to(network: &WifiNetwork) -> Self {
        WifiState {
            connected: true,
            signal_strength: network.signal_strength.min(100),
            ssid: Some(network.ssid.clone()),
            ip: network.ip.clone(),
        }
    }

    pub fn disconnected() -> Self {
        WifiState {
            connected: false,
            signal_strength: 0,
            ssid: None,
            ip: UNKNOWN_IP.to_string(),
        }
    }

    pub fn quality_label(&self) -> &'static str {
        wifi_quality_label(self.signal_strength)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellularState {
    pub connected: bool,
    /// 1..=5, static configuration
    pub strength: u8,
    pub operator: String,
}

impl CellularState {
    pub fn new(connected: bool, strength: u8) -> Self {
        CellularState {
            connected,
            strength: strength.clamp(MIN_CELL_STRENGTH, MAX_CELL_STRENGTH),
            operator: "MiOperador Móvil".to_string(),
        }
    }

    pub fn quality_label(&self) -> &'static str {
        cellular_quality_label(self.strength)
    }
}

/// Display bucket for cellular strength.
pub fn cellular_quality_label(strength: u8) -> &'static str {
    match strength {
        5 => "Excelente",
        4 => "Buena",
        _ => "Regular",
    }
}

/// Display bucket for Wi-Fi signal.
pub fn wifi_quality_label(signal: u8) -> &'static str {
    match signal {
        75..=u8::MAX => "Excelente",
        50..=74 => "Buena",
        1..=49 => "Regular",
        0 => "Sin señal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cellular_labels() {
        assert_eq!(cellular_quality_label(5), "Excelente");
        assert_eq!(cellular_quality_label(4), "Buena");
        assert_eq!(cellular_quality_label(3), "Regular");
        assert_eq!(cellular_quality_label(1), "Regular");
    }

    #[test]
    fn test_cellular_strength_is_clamped() {
        assert_eq!(CellularState::new(true, 0).strength, 1);
        assert_eq!(CellularState::new(true, 9).strength, 5);
    }

    #[test]
    fn test_disconnected_wifi_uses_sentinel() {
        let wifi = WifiState::disconnected();
        assert_eq!(wifi.ip, UNKNOWN_IP);
        assert_eq!(wifi.ssid, None);
        assert_eq!(wifi.signal_strength, 0);
    }

    #[test]
    fn test_network_signal_capped() {
        let net = WifiNetwork::new("Lab", "10.0.0.2", 250);
        assert_eq!(WifiState::connected_to(&net).signal_strength, 100);
    }
}
