//! Configuration for the time-synchronization master.
//!
//! Supports TOML deserialization with defaults taken from the protocol
//! constants, so an empty configuration is a valid, interoperable master.

use crate::message::TimeSync;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Timing and resource parameters of the publication scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Minimum spacing between two publication cycles. Triggers arriving
    /// earlier are skipped and reported as success.
    #[serde(with = "humantime_serde")]
    pub min_publication_period: Duration,

    /// Maximum age of a captured timestamp. Older captures are published as
    /// the zero sentinel.
    #[serde(with = "humantime_serde")]
    pub max_publication_period: Duration,

    /// Lifetime of the shared transfer-ID registry entry between accesses.
    #[serde(with = "humantime_serde")]
    pub publisher_timeout: Duration,

    /// Upper bound on concurrently tracked outgoing transfer streams.
    pub registry_capacity: usize,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            min_publication_period: Duration::from_millis(TimeSync::MIN_PUBLICATION_PERIOD_MS),
            max_publication_period: Duration::from_millis(TimeSync::MAX_PUBLICATION_PERIOD_MS),
            publisher_timeout: Duration::from_millis(TimeSync::PUBLISHER_TIMEOUT_MS),
            registry_capacity: 64,
        }
    }
}

impl MasterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
