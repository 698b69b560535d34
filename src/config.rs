use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// String settings keyed by name.
pub trait ConfigStore {
    fn read_string(&self, key: &str, default: &str) -> String;

    fn write_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// On-disk layout: one flat table of string settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Settings {
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

/// Settings persisted as a flat TOML table.
#[derive(Debug, Clone)]
pub struct TomlConfig {
    path: PathBuf,
    settings: Settings,
}

impl TomlConfig {
    /// Loads `path`; a missing file is an empty config.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Ok(TomlConfig { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string(&self.settings)?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

impl ConfigStore for TomlConfig {
    fn read_string(&self, key: &str, default: &str) -> String {
        self.settings.values.get(key).cloned().unwrap_or_else(|| default.to_string())
    }

    // The in-memory value is kept even when saving fails.
    fn write_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.settings.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<String, String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl ConfigStore for MemoryConfig {
    fn read_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    fn write_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set(key, value);
        Ok(())
    }
}
