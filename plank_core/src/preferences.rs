//! Preferences persistence with file locking.
//!
//! Loading never fails: missing, unreadable or corrupt data falls back to
//! the defaults, and missing keys are filled from them.

use crate::{Error, Preferences, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Namespaced key the preferences are stored under
pub const PREFERENCES_KEY: &str = "plankflow:preferences";

/// File name used by [`JsonFileStore`] inside the data directory
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Load/save interface for user preferences
pub trait PreferencesStore {
    fn load(&self) -> Preferences;
    fn save(&self, preferences: &Preferences) -> Result<()>;
}

/// Parse stored JSON, merging over the defaults
///
/// Body data must be positive; other values are replaced by the default.
pub fn parse_preferences(raw: &str) -> Result<Preferences> {
    let mut prefs: Preferences = serde_json::from_str(raw)?;
    let defaults = Preferences::default();
    if !(prefs.weight_kg.is_finite() && prefs.weight_kg > 0.0) {
        tracing::warn!("Ignoring stored weight {}, using default", prefs.weight_kg);
        prefs.weight_kg = defaults.weight_kg;
    }
    if !(prefs.height_cm.is_finite() && prefs.height_cm > 0.0) {
        tracing::warn!("Ignoring stored height {}, using default", prefs.height_cm);
        prefs.height_cm = defaults.height_cm;
    }
    Ok(prefs)
}

/// Preferences kept in a JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/preferences.json`
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_locked(&self) -> std::io::Result<String> {
        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read?;
        Ok(contents)
    }
}

impl PreferencesStore for JsonFileStore {
    fn load(&self) -> Preferences {
        if !self.path.exists() {
            tracing::info!("No preferences file found, using defaults");
            return Preferences::default();
        }

        let contents = match self.read_locked() {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(
                    "Failed to read preferences {:?}: {}. Using defaults.",
                    self.path,
                    e
                );
                return Preferences::default();
            }
        };

        match parse_preferences(&contents) {
            Ok(prefs) => {
                tracing::debug!("Loaded preferences from {:?}", self.path);
                prefs
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse preferences {:?}: {}. Using defaults.",
                    self.path,
                    e
                );
                Preferences::default()
            }
        }
    }

    /// Write atomically: temp file, fsync, rename over the original
    fn save(&self, preferences: &Preferences) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Other("preferences path missing parent".into()))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(preferences)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

/// In-process key-value store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw text under the preferences key
    pub fn set_raw(&self, raw: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(PREFERENCES_KEY.to_string(), raw.into());
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(PREFERENCES_KEY).cloned())
    }
}

impl PreferencesStore for MemoryStore {
    fn load(&self) -> Preferences {
        let Some(raw) = self.raw() else {
            return Preferences::default();
        };
        parse_preferences(&raw).unwrap_or_else(|e| {
            tracing::warn!("Stored preferences are corrupt: {}. Using defaults.", e);
            Preferences::default()
        })
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        let raw = serde_json::to_string(preferences)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Other("preferences store lock poisoned".into()))?;
        entries.insert(PREFERENCES_KEY.to_string(), raw);
        Ok(())
    }
}
