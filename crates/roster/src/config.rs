//! Configuration management for roster.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roster";

/// Allowed characters for database and collection names.
const NAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROSTER_`)
/// 2. TOML config file at `~/.config/roster/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Interface configuration.
    pub ui: UiConfig,
}

/// Where the student documents live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding database files.
    /// Defaults to `~/.local/share/roster`
    pub data_dir: Option<PathBuf>,
    /// Database name; the file is `<data_dir>/<database>.db`.
    pub database: String,
    /// Collection holding the student documents.
    pub collection: String,
}

/// Interface behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Ask before deleting a record.
    pub confirm_delete: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            database: "student_db".to_string(),
            collection: "students".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            confirm_delete: true,
        }
    }
}

impl Config {
    /// Load configuration, reading the TOML file at `config_path` or the
    /// default location.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROSTER_").split("__"));

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
    /// Returns an error if the database or collection name is empty or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn validate(&self) -> Result<()> {
        let pattern = Regex::new(NAME_PATTERN).map_err(|e| Error::ConfigValidation {
            message: format!("invalid name pattern: {e}"),
        })?;

        for (key, value) in [
            ("store.database", &self.store.database),
            ("store.collection", &self.store.collection),
        ] {
            if !pattern.is_match(value) {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "{key} must be non-empty and use only letters, digits, '_' or '-', got '{value}'"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.store
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Path of the database file for the configured database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(format!("{}.db", self.store.database))
    }
}
