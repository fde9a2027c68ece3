//! # Application configuration
//!
//! A single YAML file `config.yaml` at the root of the data directory, next
//! to the key-value files:
//!
//! ```text
//! data/
//! ├── config.yaml         ← This module manages this file
//! ├── reservations.json
//! ├── expenses.json
//! └── darkMode.json
//! ```
//!
//! ```yaml
//! data_format_version: "1.0"
//! upcoming_limit: 3
//! currency_symbol: "R$"
//! export_directory: ~
//! ```
//!
//! The file is created with defaults on first run. Unknown or missing fields
//! fall back to their defaults so older files keep loading.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::domain::dashboard::DEFAULT_UPCOMING_LIMIT;
use crate::storage::JsonConnection;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// How many reservations the dashboard's "upcoming" card shows
    pub upcoming_limit: usize,
    /// Prefix used when printing amounts
    pub currency_symbol: String,
    /// Where `export` writes backups when no directory is given
    pub export_directory: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_format_version: "1.0".to_string(),
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            currency_symbol: "R$".to_string(),
            export_directory: None,
        }
    }
}

/// YAML-backed configuration repository
#[derive(Clone)]
pub struct ConfigRepository {
    connection: JsonConnection,
}

impl ConfigRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.base_directory().join(CONFIG_FILE_NAME)
    }

    /// Load the configuration, writing the defaults if the file doesn't exist
    pub fn load_or_create(&self) -> Result<AppConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: AppConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = AppConfig::default();
            self.save(&config)?;
            info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.connection.ensure_base_directory()?;
        let config_path = self.config_path();

        let yaml_content = serde_yaml::to_string(config)?;

        let temp_path = config_path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved config to {:?}", config_path);
        Ok(())
    }
}
