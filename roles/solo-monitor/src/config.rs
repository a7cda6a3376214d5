use ext_config::{Config as Settings, File, FileFormat};
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

use crate::{alerts::Permission, error::MonitorError};

pub const DEFAULT_ADDRESS: &str = "bc1qd6mfkav3yzztuhpq6qg0kfm5fc2ay7jvy52rdn";
pub const DEFAULT_ENDPOINT: &str = "https://broad-cell-151e.schne564.workers.dev/";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub default_address: String,
    pub refresh_interval_ms: u64,
    pub max_history_items: usize,
    pub highlight_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_address: DEFAULT_ADDRESS.to_string(),
            refresh_interval_ms: 5000,
            max_history_items: 10,
            highlight_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    pub request_timeout_secs: u64,
    pub pool_idle_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            pool_idle_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".solo-monitor"),
            export_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub permission: Permission,
    pub sound: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            permission: Permission::NotAsked,
            sound: true,
        }
    }
}

impl Config {
    /// Load the TOML config file at `path`, falling back to built-in defaults
    /// for anything the file (or a missing file) leaves out.
    pub fn load(path: &str) -> Result<Self, MonitorError> {
        let settings = Settings::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .build()?;
        Self::from_settings(settings)
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self, MonitorError> {
        let settings = Settings::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Settings) -> Result<Self, MonitorError> {
        let config = settings.try_deserialize::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.monitor.refresh_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig(
                "monitor.refresh_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.monitor.max_history_items == 0 {
            return Err(MonitorError::InvalidConfig(
                "monitor.max_history_items must be greater than 0".to_string(),
            ));
        }
        if self.endpoint.url.trim().is_empty() {
            return Err(MonitorError::InvalidConfig(
                "Missing required config: endpoint.url".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.refresh_interval_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.monitor.highlight_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.request_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.pool_idle_timeout_secs)
    }
}
