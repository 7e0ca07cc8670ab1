//! Local key/value storage.
//!
//! The simulator persists exactly one scalar outside the settings file (the
//! game high score). Values live in a flat JSON object at
//! `~/.local/share/pocket-phone/storage.json`.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the global storage path: ~/.local/share/pocket-phone/storage.json
pub fn get_global_storage_path() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .ok_or_else(|| {
            ConfigError::ValidationFailed("Cannot determine data directory".to_string())
        })?;

    Ok(data_dir.join("pocket-phone").join("storage.json"))
}

/// Flat string-keyed JSON store backed by one file.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    path: PathBuf,
}

impl KeyValueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyValueFile { path: path.into() }
    }

    /// Store at the global storage path.
    pub fn global() -> Result<Self, ConfigError> {
        Ok(Self::new(get_global_storage_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!(
                    "[Storage] Ignoring unreadable store {}: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }

    /// Read a value. Missing files and keys both yield `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    /// Write a value, creating the file and its directory on first use.
    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(ConfigError::IoError)?;
        }

        let content = serde_json::to_string_pretty(&entries).map_err(ConfigError::InvalidJson)?;
        fs::write(&self.path, content).map_err(ConfigError::IoError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = KeyValueFile::new(dir.path().join("nested/storage.json"));

        assert_eq!(store.get("k"), None);
        store.set("k", "42").unwrap();
        store.set("other", "x").unwrap();
        assert_eq!(store.get("k"), Some("42".to_string()));
        assert_eq!(store.get("other"), Some("x".to_string()));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let store = KeyValueFile::new(&path);
        assert_eq!(store.get("k"), None);
        store.set("k", "1").unwrap();
        assert_eq!(store.get("k"), Some("1".to_string()));
    }
}
