//! Run configuration for dataset preparation.
//!
//! The entry point takes no arguments, so the configuration file is found
//! through the `PREP_DATA_CONFIG` environment variable, or as
//! `prep-data.toml` in the working directory. Without either, every field
//! takes its default.

use crate::ChainOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "PREP_DATA_CONFIG";
pub const CONFIG_FILE: &str = "prep-data.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where candidate strings come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum SourceConfig {
    /// Random linear chains.
    Random(ChainOptions),
    /// One candidate per line of a text file.
    File { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Random(ChainOptions::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub data_size: usize,
    pub competition_size: usize,
    /// Seed of the shuffle that splits the pool.
    pub seed: u64,
    /// Graphs must have strictly fewer nodes than this.
    pub max_nodes: usize,
    pub output_dir: PathBuf,
    pub data_store: String,
    pub competition_store: String,
    /// Optional TOML parameter table replacing the embedded one.
    pub forcefield: Option<PathBuf>,
    pub source: SourceConfig,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            data_size: 2000,
            competition_size: 100,
            seed: 42,
            max_nodes: 100,
            output_dir: PathBuf::from("."),
            data_store: "data".to_string(),
            competition_store: "competition".to_string(),
            forcefield: None,
            source: SourceConfig::default(),
        }
    }
}

impl PrepConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PrepConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Finds the configuration from the environment and working directory.
    pub fn locate() -> Result<Self, ConfigError> {
        Self::locate_from(std::env::var_os(CONFIG_ENV).map(PathBuf::from), Path::new("."))
    }

    /// Loads `explicit` if given, else `dir/prep-data.toml` if it exists,
    /// else the defaults.
    pub fn locate_from(explicit: Option<PathBuf>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Using configuration {}", path.display());
            return Self::from_path(path);
        }
        let local = dir.join(CONFIG_FILE);
        if local.is_file() {
            info!("Using configuration {}", local.display());
            return Self::from_path(local);
        }
        info!("No configuration file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Number of graphs to curate before splitting.
    pub fn target_size(&self) -> usize {
        self.data_size.saturating_add(self.competition_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_size == 0 {
            return Err(ConfigError::Invalid("data_size must be positive".to_string()));
        }
        if self.data_size.checked_add(self.competition_size).is_none() {
            return Err(ConfigError::Invalid(
                "data_size + competition_size overflows".to_string(),
            ));
        }
        if self.max_nodes < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_nodes = {} admits no graph",
                self.max_nodes
            )));
        }
        if self.data_store.is_empty() || self.competition_store.is_empty() {
            return Err(ConfigError::Invalid("store names must not be empty".to_string()));
        }
        if self.data_store == self.competition_store {
            return Err(ConfigError::Invalid(format!(
                "data and competition stores are both named '{}'",
                self.data_store
            )));
        }
        if let SourceConfig::Random(options) = &self.source {
            options
                .check()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}
