//! Screen routing.
//!
//! A pure lookup from navigation state to the screen to draw. Shut down
//! beats everything, then the lock screen, then home, then the app itself.

use crate::models::AppId;

/// Screen the frontend should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Lock,
    Home,
    Phone,
    Camera,
    Microphone,
    Battery,
    Connectivity,
    Memory,
    Gallery,
    Game,
    Calculator,
    Calendar,
    Contacts,
    Messages,
    Manual,
    /// Generic external-content screen shared by the web destinations.
    WebView(AppId),
}

/// Resolve the active screen. `None` means draw nothing (screen off).
pub fn resolve(current_app: Option<AppId>, is_locked: bool, is_shut_down: bool) -> Option<ScreenId> {
    if is_shut_down {
        return None;
    }
    if is_locked {
        return Some(ScreenId::Lock);
    }
    Some(match current_app {
        None => ScreenId::Home,
        Some(app) => app_screen(app),
    })
}

/// Like `resolve`, for a raw string id. Unknown ids draw nothing.
pub fn resolve_id(current_app: Option<&str>, is_locked: bool, is_shut_down: bool) -> Option<ScreenId> {
    match current_app {
        None => resolve(None, is_locked, is_shut_down),
        Some(raw) => match AppId::from_id(raw) {
            Some(app) => resolve(Some(app), is_locked, is_shut_down),
            None if is_shut_down => None,
            None if is_locked => Some(ScreenId::Lock),
            None => {
                log::debug!("[Router] no screen for unknown app id {:?}", raw);
                None
            }
        },
    }
}

pub fn app_screen(app: AppId) -> ScreenId {
    match app {
        AppId::Phone => ScreenId::Phone,
        AppId::Camera => ScreenId::Camera,
        AppId::Microphone => ScreenId::Microphone,
        AppId::Battery => ScreenId::Battery,
        AppId::Connectivity => ScreenId::Connectivity,
        AppId::Memory => ScreenId::Memory,
        AppId::Gallery => ScreenId::Gallery,
        AppId::Game => ScreenId::Game,
        AppId::Calculator => ScreenId::Calculator,
        AppId::Calendar => ScreenId::Calendar,
        AppId::Contacts => ScreenId::Contacts,
        AppId::Messages => ScreenId::Messages,
        AppId::Manual => ScreenId::Manual,
        AppId::Amazon | AppId::Tiktok | AppId::Banco | AppId::Slither | AppId::Ujap => {
            ScreenId::WebView(app)
        }
    }
}

/// Destination shown by the external-content screen.
pub fn webview_url(app: AppId) -> Option<&'static str> {
    match app {
        AppId::Amazon => Some("https://www.mercadolibre.com.ve"),
        AppId::Tiktok => Some("https://www.cinesunidos.com"),
        AppId::Banco => Some("https://www.monitordolarvenezuela.com"),
        AppId::Slither => Some("http://slither.io"),
        AppId::Ujap => Some("https://ujap.edu.ve"),
        _ => None,
    }
}

/// Page title for a destination url.
pub fn page_title(url: &str) -> &'static str {
    if url.contains("mercadolibre") {
        "Mercado Libre"
    } else if url.contains("cinesunidos") {
        "Cines Unidos"
    } else if url.contains("monitordolar") {
        "Monitor Dólar"
    } else if url.contains("slither") {
        "Slither.io"
    } else if url.contains("ujap") {
        "UJAP"
    } else {
        "Navegador"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(resolve(Some(AppId::Game), true, true), None);
        assert_eq!(resolve(Some(AppId::Game), true, false), Some(ScreenId::Lock));
        assert_eq!(resolve(None, false, false), Some(ScreenId::Home));
        assert_eq!(resolve(Some(AppId::Game), false, false), Some(ScreenId::Game));
    }

    #[test]
    fn test_every_app_has_a_screen() {
        for app in AppId::ALL {
            let screen = resolve(Some(app), false, false);
            assert!(screen.is_some(), "{} has no screen", app);
        }
    }

    #[test]
    fn test_external_apps_share_webview() {
        for app in AppId::ALL.iter().copied().filter(AppId::is_external) {
            assert_eq!(app_screen(app), ScreenId::WebView(app));
            assert!(webview_url(app).is_some());
        }
        assert_eq!(webview_url(AppId::Gallery), None);
    }

    #[test]
    fn test_unknown_raw_id_renders_nothing() {
        assert_eq!(resolve_id(Some("browser"), false, false), None);
        assert_eq!(resolve_id(Some("browser"), true, false), Some(ScreenId::Lock));
        assert_eq!(resolve_id(Some("camera"), false, false), Some(ScreenId::Camera));
    }

    #[test]
    fn test_page_titles() {
        assert_eq!(page_title("http://slither.io"), "Slither.io");
        assert_eq!(page_title("https://example.com"), "Navegador");
    }
}
