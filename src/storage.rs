use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::alerts::AlertConfig;

const APP_DIR: &str = "kclock";
const SETTINGS_FILE: &str = "settings.toml";
const CONFIG_ENV: &str = "KCLOCK_CONFIG";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no config directory for this platform")]
    NoConfigDir,
    #[error("settings file I/O: {0}")]
    Io(#[from] io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("can't encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Alert settings on disk. The countdown itself is never stored.
pub struct SettingsStorage {
    path: Option<PathBuf>,
}

impl SettingsStorage {
    pub fn new() -> Self {
        match settings_path() {
            Ok(path) => {
                log::debug!("settings file: {}", path.display());
                Self { path: Some(path) }
            }
            Err(e) => {
                log::warn!("settings won't be saved: {}", e);
                Self { path: None }
            }
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    pub fn load_alert_config(&self) -> AlertConfig {
        let Some(path) = &self.path else {
            return AlertConfig::default();
        };
        match read_config(path) {
            Ok(Some(config)) => config,
            Ok(None) => AlertConfig::default(),
            Err(e) => {
                log::error!("Failed to load alert config: {}", e);
                AlertConfig::default()
            }
        }
    }

    pub fn save_alert_config(&self, config: &AlertConfig) {
        if let Some(path) = &self.path {
            if let Err(e) = write_config(path, config) {
                log::error!("Failed to save alert config: {}", e);
            }
        }
    }
}

fn settings_path() -> Result<PathBuf, StorageError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dirs = directories::ProjectDirs::from("", "", APP_DIR).ok_or(StorageError::NoConfigDir)?;
    Ok(dirs.config_dir().join(SETTINGS_FILE))
}

fn read_config(path: &Path) -> Result<Option<AlertConfig>, StorageError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&text)?))
}

fn write_config(path: &Path, config: &AlertConfig) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, toml::to_string(config)?)?;
    Ok(())
}
