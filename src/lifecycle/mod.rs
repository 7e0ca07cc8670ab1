//! Navigation and power lifecycle.
//!
//! `Navigator` owns which app is visible, the lock and call state, the app
//! history behind recents, and the power state machine. It is purely
//! synchronous: the controller drives the timed halves of each transition
//! and re-checks the expected state before applying them.

pub mod gallery;
pub mod state;
pub mod unlock;

pub use gallery::{Gallery, GalleryViewer};
pub use state::{PhoneMode, PowerState, RestartPhase};
pub use unlock::{GestureOutcome, UnlockGesture};

use crate::error::PhoneError;
use crate::models::{AppId, RecentApp};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallState {
    pub active: bool,
    pub number: Option<String>,
    pub name: Option<String>,
}

impl CallState {
    /// Name if known, otherwise the number.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.number.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub is_locked: bool,
    pub power: PowerState,
    /// `None` is the home screen.
    pub current_app: Option<AppId>,
    /// Most recent last, no duplicates.
    pub app_history: Vec<AppId>,
    pub call: CallState,
    pub is_recents_open: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState {
            is_locked: true,
            power: PowerState::On,
            current_app: None,
            app_history: Vec::new(),
            call: CallState::default(),
            is_recents_open: false,
        }
    }
}

impl NavigationState {
    pub fn is_powering_off(&self) -> bool {
        self.power.is_powering_off()
    }

    pub fn is_shut_down(&self) -> bool {
        self.power.is_shut_down()
    }

    pub fn is_restarting(&self) -> bool {
        self.power.is_restarting()
    }

    pub fn is_in_call(&self) -> bool {
        self.call.active
    }

    pub fn mode(&self) -> PhoneMode {
        match self.power {
            PowerState::Restarting(_) => PhoneMode::Restarting,
            PowerState::ShutDown => PhoneMode::ShutDown,
            PowerState::PoweringOff => PhoneMode::PoweringOff,
            PowerState::On if self.is_locked => PhoneMode::Locked,
            PowerState::On if self.call.active => PhoneMode::InCall,
            PowerState::On if self.current_app.is_some() => PhoneMode::AppOpen,
            PowerState::On => PhoneMode::Home,
        }
    }

    /// History minus the current app, most recent first, at most `limit`.
    pub fn recent_apps(&self, limit: usize) -> Vec<RecentApp> {
        self.app_history
            .iter()
            .rev()
            .filter(|id| Some(**id) != self.current_app)
            .take(limit)
            .map(|id| RecentApp {
                id: *id,
                name: id.display_name(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    state: NavigationState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn snapshot(&self) -> NavigationState {
        self.state.clone()
    }

    /// Switch the visible app. Returns `true` when a different app was
    /// opened, which is when the caller charges its RAM cost.
    pub fn set_current_app(&mut self, app: Option<AppId>) -> bool {
        if self.state.current_app == app {
            return false;
        }
        self.state.current_app = app;

        let Some(id) = app else {
            return false;
        };
        if self.state.app_history.last() != Some(&id) {
            let mut history: Vec<AppId> = self
                .state
                .app_history
                .iter()
                .copied()
                .filter(|h| *h != id)
                .collect();
            history.push(id);
            self.state.app_history = history;
        }
        true
    }

    /// Return home. Returns the app that was left, if any.
    pub fn go_back(&mut self) -> Option<AppId> {
        let previous = self.state.current_app;
        self.set_current_app(None);
        previous
    }

    /// Start a simulated call and bring the phone app forward.
    ///
    /// Returns whether the phone app was newly opened.
    pub fn simulate_call(&mut self, number: &str, name: Option<&str>) -> Result<bool, PhoneError> {
        if !self.state.power.is_on() {
            return Err(PhoneError::InvalidOperation(
                "El teléfono está apagado".to_string(),
            ));
        }

        self.state.call = CallState {
            active: true,
            number: Some(number.to_string()),
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
        };
        Ok(self.set_current_app(Some(AppId::Phone)))
    }

    /// Clear the call. The current app is left as is.
    pub fn end_call(&mut self) {
        self.state.call = CallState::default();
    }

    pub fn unlock(&mut self) -> bool {
        if !self.state.power.is_on() || !self.state.is_locked {
            return false;
        }
        self.state.is_locked = false;
        true
    }

    pub fn lock(&mut self) {
        self.state.is_locked = true;
        self.state.is_recents_open = false;
    }

    pub fn open_recents(&mut self) {
        self.state.is_recents_open = true;
    }

    pub fn close_recents(&mut self) {
        self.state.is_recents_open = false;
    }

    /// Open an entry of the recents overlay and dismiss the overlay.
    pub fn open_recent(&mut self, app: AppId) -> bool {
        self.state.is_recents_open = false;
        self.set_current_app(Some(app))
    }

    fn transition(&mut self, next: PowerState) -> Result<(), PhoneError> {
        self.state
            .power
            .transition_to(next)
            .map_err(PhoneError::InvalidOperation)
    }

    /// Apply `next` only if the machine is still in `expected`.
    fn advance(&mut self, expected: PowerState, next: PowerState) -> bool {
        if self.state.power != expected {
            log::debug!(
                "[Lifecycle] stale transition {} -> {} ignored (now {})",
                expected.as_str(),
                next.as_str(),
                self.state.power.as_str()
            );
            return false;
        }
        self.transition(next).is_ok()
    }

    /// `On -> PoweringOff`.
    pub fn begin_shutdown(&mut self) -> Result<(), PhoneError> {
        if !self.state.power.is_on() {
            return Err(PhoneError::InvalidOperation(format!(
                "No se puede apagar en estado {}",
                self.state.power.as_str()
            )));
        }
        self.transition(PowerState::PoweringOff)?;
        self.state.is_recents_open = false;
        Ok(())
    }

    /// `PoweringOff -> ShutDown`.
    pub fn complete_shutdown(&mut self) -> bool {
        self.advance(PowerState::PoweringOff, PowerState::ShutDown)
    }

    /// `On | ShutDown -> Restarting(Rebooting)`.
    pub fn begin_restart(&mut self) -> Result<(), PhoneError> {
        if self.state.power.is_transient() {
            return Err(PhoneError::InvalidOperation(format!(
                "Ya hay una transición en curso ({})",
                self.state.power.as_str()
            )));
        }
        self.transition(PowerState::Restarting(RestartPhase::Rebooting))?;
        self.state.is_recents_open = false;
        Ok(())
    }

    /// `Restarting(Rebooting) -> Restarting(Dark)`.
    pub fn restart_go_dark(&mut self) -> bool {
        self.advance(
            PowerState::Restarting(RestartPhase::Rebooting),
            PowerState::Restarting(RestartPhase::Dark),
        )
    }

    /// `Restarting(Dark) -> On`, locked and on the home screen.
    pub fn complete_restart(&mut self) -> bool {
        if !self.advance(PowerState::Restarting(RestartPhase::Dark), PowerState::On) {
            return false;
        }
        self.state.is_locked = true;
        self.state.current_app = None;
        self.state.is_recents_open = false;
        true
    }

    /// `ShutDown -> On`, locked.
    pub fn power_on(&mut self) -> Result<(), PhoneError> {
        if self.state.power != PowerState::ShutDown {
            return Err(PhoneError::InvalidOperation(
                "El teléfono ya está encendido".to_string(),
            ));
        }
        self.transition(PowerState::On)?;
        self.state.is_locked = true;
        self.state.current_app = None;
        Ok(())
    }
}
