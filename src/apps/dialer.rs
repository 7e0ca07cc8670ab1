//! Phone dialer model.

use once_cell::sync::Lazy;
use regex::Regex;

static DIAL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9*#+]$").expect("Invalid dial key regex")
});

/// Keypad layout, row-major.
pub const KEYPAD: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "*", "0", "#"];

pub fn is_dial_key(key: &str) -> bool {
    DIAL_KEY.is_match(key)
}

/// Digits typed on the keypad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialer {
    number: String,
}

impl Dialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// Append a key. Rejected keys and input during a call are ignored.
    pub fn press(&mut self, key: &str, in_call: bool) -> bool {
        if in_call || !is_dial_key(key) {
            return false;
        }
        self.number.push_str(key);
        true
    }

    pub fn backspace(&mut self) {
        self.number.pop();
    }

    /// Number to dial, if anything was typed.
    pub fn dial(&self) -> Option<&str> {
        if self.number.is_empty() {
            None
        } else {
            Some(&self.number)
        }
    }
}

/// `mm:ss` for the in-call timer.
pub fn format_call_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Avatar letter for the call screen.
pub fn caller_initial(name: Option<&str>, number: Option<&str>) -> String {
    name.or(number)
        .and_then(|s| s.chars().next())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dial_keys_accepted() {
        let mut dialer = Dialer::new();
        for key in ["5", "*", "#", "+", "a", "12", " "] {
            dialer.press(key, false);
        }
        assert_eq!(dialer.number(), "5*#+");
    }

    #[test]
    fn test_no_input_during_call() {
        let mut dialer = Dialer::new();
        assert!(!dialer.press("1", true));
        assert_eq!(dialer.dial(), None);
    }

    #[test]
    fn test_backspace() {
        let mut dialer = Dialer::new();
        dialer.press("4", false);
        dialer.press("2", false);
        dialer.backspace();
        assert_eq!(dialer.dial(), Some("4"));
        dialer.backspace();
        dialer.backspace();
        assert_eq!(dialer.number(), "");
    }

    #[test]
    fn test_format_call_duration() {
        assert_eq!(format_call_duration(0), "00:00");
        assert_eq!(format_call_duration(75), "01:15");
        assert_eq!(format_call_duration(3600), "60:00");
    }

    #[test]
    fn test_caller_initial() {
        assert_eq!(caller_initial(Some("ana"), Some("555")), "A");
        assert_eq!(caller_initial(None, Some("555")), "5");
        assert_eq!(caller_initial(None, None), "?");
    }
}
