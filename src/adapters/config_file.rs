//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] by reading an [`OtaConfig`] from a JSON file
//! on the storage partition. Missing fields take their defaults, so the
//! file only needs the values that differ (usually `server_url` and `apn`).

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::OtaConfig;

/// Default location of the config file on the device.
pub const CONFIG_PATH: &str = "/storage/ota_config.json";

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored config, or the defaults when none has been written.
    /// A file that exists but is corrupt or invalid is still an error.
    pub fn load_or_default(&self) -> Result<OtaConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                info!("No config at {}; using defaults", self.path.display());
                Ok(OtaConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<OtaConfig, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: OtaConfig = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Config {} unreadable: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("Loaded config from {}", self.path.display());
        Ok(config)
    }
}
