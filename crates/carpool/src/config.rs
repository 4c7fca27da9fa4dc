//! Configuration management for carpool.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{PAYMENT_VALUE, STORAGE_KEY};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "carpool";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "carpool.db";

/// Prefix for environment overrides, e.g. `CARPOOL_LEDGER__FARE=25`.
const ENV_PREFIX: &str = "CARPOOL_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CARPOOL_`, sections split on `__`)
/// 2. TOML config file at `~/.config/carpool/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/carpool/carpool.db`
    pub database_path: Option<PathBuf>,
    /// Key the ledger blob is stored under.
    pub key: String,
}

/// Ledger-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fare charged per paid participant.
    pub fare: f64,
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory backups and summaries are written to.
    /// Defaults to the current directory.
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            key: STORAGE_KEY.to_string(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fare: PAYMENT_VALUE,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.ledger.fare.is_finite() || self.ledger.fare < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "fare must be a non-negative number, got {}",
                    self.ledger.fare
                ),
            });
        }

        if self.storage.key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage key must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, defaulting to the current directory.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
