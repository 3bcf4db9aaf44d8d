//! Configuration loading and typed config structures for Knightfall.
//!
//! The canonical configuration lives in `knightfall-config.yaml` next to
//! the binary. This module defines strongly-typed structs that mirror the
//! YAML structure and provides a loader that reads and validates the file.
//! Every field has a default so a missing file means a playable round.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `knightfall-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Round-level settings (seed, speed).
    #[serde(default)]
    pub round: RoundConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Round-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoundConfig {
    /// Random seed for reproducible rounds. 0 means seed from entropy.
    #[serde(default)]
    pub seed: u64,

    /// Scalar compressing all tick intervals and derived delays.
    /// The base cadence is one tick per second.
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Default speed multiplier (real-time: one tick per second).
const fn default_speed_multiplier() -> f64 {
    1.0
}

/// Default tracing filter.
fn default_log_level() -> String {
    String::from("info")
}
