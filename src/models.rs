//! Core data structures shared by every module.
//!
//! `AppId` is the closed set of mock applications the phone can run. Every
//! other module keys its tables (RAM cost, screens, labels) by it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identifier of a mock application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppId {
    Phone,
    Camera,
    Gallery,
    Game,
    Calculator,
    Microphone,
    Battery,
    Connectivity,
    Memory,
    Calendar,
    Contacts,
    Messages,
    Amazon,
    Tiktok,
    Banco,
    Slither,
    Ujap,
    Manual,
}

impl AppId {
    /// Every app, in home screen order.
    pub const ALL: [AppId; 18] = [
        AppId::Phone,
        AppId::Camera,
        AppId::Gallery,
        AppId::Game,
        AppId::Calculator,
        AppId::Microphone,
        AppId::Battery,
        AppId::Connectivity,
        AppId::Memory,
        AppId::Calendar,
        AppId::Contacts,
        AppId::Messages,
        AppId::Amazon,
        AppId::Tiktok,
        AppId::Banco,
        AppId::Slither,
        AppId::Ujap,
        AppId::Manual,
    ];

    /// Stable string id of the app.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppId::Phone => "phone",
            AppId::Camera => "camera",
            AppId::Gallery => "gallery",
            AppId::Game => "game",
            AppId::Calculator => "calculator",
            AppId::Microphone => "microphone",
            AppId::Battery => "battery",
            AppId::Connectivity => "connectivity",
            AppId::Memory => "memory",
            AppId::Calendar => "calendar",
            AppId::Contacts => "contacts",
            AppId::Messages => "messages",
            AppId::Amazon => "amazon",
            AppId::Tiktok => "tiktok",
            AppId::Banco => "banco",
            AppId::Slither => "slither",
            AppId::Ujap => "ujap",
            AppId::Manual => "manual",
        }
    }

    /// Parse a raw string id. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<AppId> {
        AppId::ALL.iter().copied().find(|app| app.as_str() == id)
    }

    /// Label from the system app-name table, if the app has one.
    pub fn label(&self) -> Option<&'static str> {
        let label = match self {
            AppId::Phone => "Teléfono",
            AppId::Camera => "Cámara",
            AppId::Microphone => "Micrófono",
            AppId::Battery => "Batería",
            AppId::Connectivity => "Wi-Fi y Datos",
            AppId::Memory => "Almacenamiento",
            AppId::Gallery => "Galería",
            AppId::Game => "Juego",
            AppId::Calculator => "Calculadora",
            AppId::Calendar => "Calendario",
            AppId::Contacts => "Contactos",
            AppId::Messages => "Mensajes",
            AppId::Amazon => "Amazon",
            AppId::Tiktok => "TikTok",
            AppId::Banco => "Banco",
            AppId::Slither => "Slither.io",
            AppId::Ujap => "UJAP",
            AppId::Manual => return None,
        };
        Some(label)
    }

    /// Display name used by recents: the table label, or the raw id.
    pub fn display_name(&self) -> &'static str {
        self.label().unwrap_or_else(|| self.as_str())
    }

    /// Caption under the icon on the home screen.
    pub fn home_label(&self) -> &'static str {
        match self {
            AppId::Connectivity => "Wi-Fi",
            AppId::Amazon => "Mercado Libre",
            AppId::Tiktok => "Cines Unidos",
            AppId::Banco => "BCV",
            AppId::Manual => "Manual",
            other => other.display_name(),
        }
    }

    /// Apps that stand in for an outside destination.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            AppId::Amazon | AppId::Tiktok | AppId::Banco | AppId::Slither | AppId::Ujap
        )
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the recents list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentApp {
    pub id: AppId,
    pub name: &'static str,
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient user-visible message (toast).
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Local>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
            created_at: Local::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_roundtrips_every_app() {
        for app in AppId::ALL {
            assert_eq!(AppId::from_id(app.as_str()), Some(app));
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert_eq!(AppId::from_id("browser"), None);
        assert_eq!(AppId::from_id(""), None);
    }

    #[test]
    fn test_display_name_falls_back_to_raw_id() {
        assert_eq!(AppId::Phone.display_name(), "Teléfono");
        assert_eq!(AppId::Manual.display_name(), "manual");
    }

    #[test]
    fn test_external_apps() {
        let external: Vec<_> = AppId::ALL.iter().filter(|a| a.is_external()).collect();
        assert_eq!(external.len(), 5);
        assert!(!AppId::Gallery.is_external());
    }

    #[test]
    fn test_app_id_serializes_lowercase() {
        let json = serde_json::to_string(&AppId::Connectivity).unwrap();
        assert_eq!(json, "\"connectivity\"");
    }
}
