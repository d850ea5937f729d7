//! Configuration for the research archive
//!
//! Storage location plus the limits and timings used by the store, the
//! search history, and the notification queue.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::DEFAULT_NOTIFICATION_TTL_SECS;
use crate::query::DEFAULT_RECENTLY_ADDED_LIMIT;

/// Default number of search terms kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Archive-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory holding the key-value files
    pub data_dir: PathBuf,
    /// Maximum search history entries
    pub history_limit: usize,
    /// Seconds a notification stays visible
    pub notification_ttl_secs: u64,
    /// Items shown in the recently-added strip
    pub recently_added_limit: usize,
    /// Seed the sample dataset when no collection is stored
    pub seed_sample_data: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            recently_added_limit: DEFAULT_RECENTLY_ADDED_LIMIT,
            seed_sample_data: true,
        }
    }
}

/// Platform data directory, falling back to the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("research-archive")
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl ArchiveConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults rooted at a specific data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a TOML file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::OutOfRange(
                "history_limit must be positive".to_string(),
            ));
        }

        if self.notification_ttl_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "notification_ttl_secs must be positive".to_string(),
            ));
        }

        if self.recently_added_limit == 0 {
            return Err(ConfigError::OutOfRange(
                "recently_added_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
