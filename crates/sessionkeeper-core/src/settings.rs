//! Ordinary (non-secure) application settings.
//!
//! Holds flags that must survive restarts but are not secrets, such as the
//! first-run marker. Settings are stored at
//! `~/.config/<app>/settings.json` by default.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

/// Settings file name
const SETTINGS_FILE: &str = "settings.json";

/// Key-value flag storage.
pub trait Settings: Send + Sync {
    /// Read a flag. Missing or non-boolean values read as `false`.
    fn get_bool(&self, key: &str) -> bool;

    fn set_bool(&self, key: &str, value: bool) -> Result<()>;
}

/// Settings persisted as a JSON object on disk.
///
/// Writes go straight to the file; reads always reload it.
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file under the user's config directory for `app_name`.
    pub fn for_app(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(Self::new(config_dir.join(app_name).join(SETTINGS_FILE)))
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", self.path.display()))
    }

    fn save(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;
        Ok(())
    }
}

impl Settings for FileSettings {
    fn get_bool(&self, key: &str) -> bool {
        match self.load() {
            Ok(values) => values.get(key).and_then(Value::as_bool).unwrap_or(false),
            Err(e) => {
                warn!("{:#}", e);
                false
            }
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        // An unreadable file is replaced rather than blocking the write
        let mut values = self.load().unwrap_or_default();
        values.insert(key.to_string(), Value::Bool(value));
        self.save(&values)
    }
}

/// Settings kept in memory for the life of the value.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, bool>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Settings for MemorySettings {
    fn get_bool(&self, key: &str) -> bool {
        self.values().get(key).copied().unwrap_or(false)
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }
}
