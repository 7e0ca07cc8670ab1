//! Power state machine and the derived phone mode.
//!
//! **Architecture**:
//! - `PowerState`: discrete power phases, validated with `can_transition_to`
//! - `RestartPhase`: the two halves of a restart (rebooting, then dark)
//! - `PhoneMode`: the single mode the UI is in, derived from navigation state

use serde::{Deserialize, Serialize};

/// Sub-phase of a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestartPhase {
    /// "Reiniciando..." overlay
    Rebooting,
    /// Screen goes black before boot
    Dark,
}

/// Power lifecycle of the phone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    On,
    PoweringOff,
    ShutDown,
    Restarting(RestartPhase),
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::PoweringOff => "powering-off",
            PowerState::ShutDown => "shut-down",
            PowerState::Restarting(RestartPhase::Rebooting) => "restarting",
            PowerState::Restarting(RestartPhase::Dark) => "restarting-dark",
        }
    }

    /// Every state reachable in one step from this one.
    pub fn valid_next_states(&self) -> Vec<PowerState> {
        match self {
            PowerState::On => vec![
                PowerState::PoweringOff,
                PowerState::Restarting(RestartPhase::Rebooting),
            ],
            PowerState::PoweringOff => vec![PowerState::ShutDown],
            PowerState::ShutDown => vec![
                PowerState::On,
                PowerState::Restarting(RestartPhase::Rebooting),
            ],
            PowerState::Restarting(RestartPhase::Rebooting) => {
                vec![PowerState::Restarting(RestartPhase::Dark)]
            }
            PowerState::Restarting(RestartPhase::Dark) => vec![PowerState::On],
        }
    }

    pub fn can_transition_to(&self, next: PowerState) -> bool {
        self.valid_next_states().contains(&next)
    }

    /// Apply a transition, refusing invalid ones.
    pub fn transition_to(&mut self, next: PowerState) -> Result<(), String> {
        if !self.can_transition_to(next) {
            return Err(format!(
                "Invalid power transition: {} -> {}",
                self.as_str(),
                next.as_str()
            ));
        }
        *self = next;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }

    pub fn is_powering_off(&self) -> bool {
        matches!(self, PowerState::PoweringOff)
    }

    /// True when the screen is off, including the dark half of a restart.
    pub fn is_shut_down(&self) -> bool {
        matches!(
            self,
            PowerState::ShutDown | PowerState::Restarting(RestartPhase::Dark)
        )
    }

    pub fn is_restarting(&self) -> bool {
        matches!(self, PowerState::Restarting(_))
    }

    /// A timed transition is in flight.
    pub fn is_transient(&self) -> bool {
        matches!(self, PowerState::PoweringOff | PowerState::Restarting(_))
    }
}

/// What the phone is showing, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneMode {
    Locked,
    Home,
    AppOpen,
    InCall,
    PoweringOff,
    ShutDown,
    Restarting,
}

impl PhoneMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneMode::Locked => "locked",
            PhoneMode::Home => "home",
            PhoneMode::AppOpen => "app-open",
            PhoneMode::InCall => "in-call",
            PhoneMode::PoweringOff => "powering-off",
            PhoneMode::ShutDown => "shut-down",
            PhoneMode::Restarting => "restarting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_on() {
        assert_eq!(PowerState::default(), PowerState::On);
        assert!(PowerState::default().is_on());
    }

    #[test]
    fn test_shutdown_path() {
        let mut state = PowerState::On;
        assert!(state.transition_to(PowerState::PoweringOff).is_ok());
        assert!(state.transition_to(PowerState::ShutDown).is_ok());
        assert!(state.is_shut_down());
        assert!(!state.is_restarting());
    }

    #[test]
    fn test_restart_path() {
        let mut state = PowerState::On;
        state
            .transition_to(PowerState::Restarting(RestartPhase::Rebooting))
            .unwrap();
        assert!(state.is_restarting() && !state.is_shut_down());

        state
            .transition_to(PowerState::Restarting(RestartPhase::Dark))
            .unwrap();
        // the dark phase reports both flags
        assert!(state.is_restarting() && state.is_shut_down());

        state.transition_to(PowerState::On).unwrap();
        assert!(state.is_on());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut state = PowerState::PoweringOff;
        assert!(state
            .transition_to(PowerState::Restarting(RestartPhase::Rebooting))
            .is_err());
        assert_eq!(state, PowerState::PoweringOff);

        assert!(!PowerState::On.can_transition_to(PowerState::ShutDown));
        assert!(!PowerState::Restarting(RestartPhase::Rebooting).can_transition_to(PowerState::On));
    }

    #[test]
    fn test_flags_are_exclusive_outside_dark_phase() {
        for state in [PowerState::On, PowerState::PoweringOff, PowerState::ShutDown] {
            let flags = [state.is_powering_off(), state.is_shut_down(), state.is_restarting()];
            assert!(flags.iter().filter(|f| **f).count() <= 1, "{:?}", state);
        }
    }
}
