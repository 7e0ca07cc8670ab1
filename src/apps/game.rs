//! "Clic de Colores": tap to score, the best score survives restarts.

use crate::config::storage::KeyValueFile;
use crate::error::ConfigError;
use rand::seq::SliceRandom;

/// Storage key of the persisted high score.
pub const HIGH_SCORE_KEY: &str = "pocketPhoneGameHighScore";

pub const BUTTON_COLORS: [&str; 8] = [
    "#3498db", "#2ecc71", "#e74c3c", "#f39c12", "#9b59b6", "#1abc9c", "#d35400", "#8e44ad",
];

/// Persistence of the single high-score scalar.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    file: KeyValueFile,
}

impl HighScoreStore {
    pub fn new(file: KeyValueFile) -> Self {
        HighScoreStore { file }
    }

    /// Missing or unparsable values read as zero.
    pub fn load(&self) -> u32 {
        self.file
            .get(HIGH_SCORE_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn save(&self, score: u32) -> Result<(), ConfigError> {
        self.file.set(HIGH_SCORE_KEY, &score.to_string())
    }
}

pub struct TapGame {
    score: u32,
    high_score: u32,
    color: &'static str,
    store: Option<HighScoreStore>,
}

impl TapGame {
    /// Game with the high score loaded from `store`.
    pub fn new(store: Option<HighScoreStore>) -> Self {
        let high_score = store.as_ref().map_or(0, HighScoreStore::load);
        TapGame {
            score: 0,
            high_score,
            color: BUTTON_COLORS[0],
            store,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    /// Score a point. A new record is persisted immediately.
    pub fn tap(&mut self) -> Result<(), ConfigError> {
        self.score += 1;
        self.color = BUTTON_COLORS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(BUTTON_COLORS[0]);

        if self.score > self.high_score {
            self.high_score = self.score;
            if let Some(store) = &self.store {
                store.save(self.high_score)?;
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.color = BUTTON_COLORS[0];
    }
}

/// Parse `#rrggbb`.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = HighScoreStore::new(KeyValueFile::new(dir.path().join("storage.json")));

        let mut game = TapGame::new(Some(store.clone()));
        for _ in 0..3 {
            game.tap().unwrap();
        }
        game.reset();
        game.tap().unwrap();
        assert_eq!(game.score(), 1);
        assert_eq!(game.high_score(), 3);

        let reloaded = TapGame::new(Some(store));
        assert_eq!(reloaded.high_score(), 3);
    }

    #[test]
    fn test_garbage_high_score_reads_zero() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = KeyValueFile::new(dir.path().join("storage.json"));
        file.set(HIGH_SCORE_KEY, "abc").unwrap();
        assert_eq!(HighScoreStore::new(file).load(), 0);
    }

    #[test]
    fn test_game_without_store() {
        let mut game = TapGame::new(None);
        game.tap().unwrap();
        assert_eq!(game.high_score(), 1);
        assert!(BUTTON_COLORS.contains(&game.color()));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#3498db"), Some([0x34, 0x98, 0xdb]));
        assert_eq!(parse_hex_color("3498db"), None);
        assert_eq!(parse_hex_color("#12"), None);
    }
}
