// src/preferences.rs
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::Mode;

/// Key under which the analysis mode is persisted.
pub const MODE_KEY: &str = "analyzer_mode";

const APP_DIR: &str = "security-analyzer";
const PREFS_FILENAME: &str = "preferences.toml";

/// A small persistent key-value store for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Reads the persisted mode. Unreadable or unknown values fall back to the
/// default mode.
pub fn load_mode<P: PreferenceStore + ?Sized>(prefs: &P) -> Mode {
    match prefs.get(MODE_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            log::warn!("Ignoring stored preference: {}", e);
            Mode::default()
        }),
        Ok(None) => Mode::default(),
        Err(e) => {
            log::warn!("Could not read preferences, using default mode: {}", e);
            Mode::default()
        }
    }
}

pub fn save_mode<P: PreferenceStore + ?Sized>(prefs: &mut P, mode: Mode) -> Result<()> {
    prefs.set(MODE_KEY, mode.as_str())
}

/// Preferences kept as a flat TOML table on disk.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/security-analyzer/preferences.toml`, falling back to the
    /// working directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(PREFS_FILENAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, toml::to_string(&values)?)?;
        log::debug!("Saved preference {}={} to {}", key, value, self.path.display());
        Ok(())
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
