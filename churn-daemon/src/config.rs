//! Configuration loading for churn-daemon.
//!
//! Configuration is loaded from a TOML file (default: `churn.toml`).

use churn_core::{ContainerId, Fleet, FleetError};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration for churn-daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fleet membership configuration.
    pub fleet: FleetConfig,
    /// Disruption cadence configuration.
    #[serde(default)]
    pub disruption: DisruptionConfig,
    /// Probe timeout configuration.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Fleet membership configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    /// Containers under management, in order.
    pub containers: Vec<String>,
    /// Identifier prefix that marks the fleet as a consensus group
    /// (default: "etcd").
    #[serde(default = "default_consensus_prefix")]
    pub consensus_prefix: String,
}

/// Disruption cadence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisruptionConfig {
    /// Containers restarted per cycle (default: 0 = monitoring only).
    #[serde(default)]
    pub restart_batch_size: usize,
    /// Tick interval in milliseconds (default: 10000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Probe timeout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Bound in seconds on every runtime/leadership query (default: 5).
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    /// Stop grace period in seconds Docker applies during a restart
    /// (default: 10).
    #[serde(default = "default_stop_timeout_secs")]
    pub restart_stop_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Output format (default: console).
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Console,
    /// Newline-delimited JSON.
    Json,
}

// Default value functions
fn default_consensus_prefix() -> String {
    "etcd".to_string()
}

fn default_interval_ms() -> u64 {
    10_000
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_stop_timeout_secs() -> u64 {
    10
}

impl Default for DisruptionConfig {
    fn default() -> Self {
        Self {
            restart_batch_size: 0,
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout_secs(),
            restart_stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Console,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Build the validated fleet from the configured container list.
    ///
    /// An empty list, an entry that trims to nothing, or a duplicate
    /// identifier is a fatal configuration error.
    pub fn fleet(&self) -> Result<Fleet, ConfigError> {
        let members: Vec<ContainerId> = self
            .fleet
            .containers
            .iter()
            .map(|name| ContainerId::new(name.as_str()))
            .collect();

        if members.iter().any(|m| m.as_str().is_empty()) {
            return Err(ConfigError::BlankContainerName);
        }

        Ok(Fleet::new(members)?)
    }

    /// Validate the non-fleet settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.disruption.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// The fleet list was empty or contained duplicates.
    #[error(transparent)]
    InvalidFleet(#[from] FleetError),
    /// A container entry was blank after trimming.
    #[error("fleet contains a blank container name")]
    BlankContainerName,
    /// The tick interval must be positive.
    #[error("disruption.interval_ms must be greater than zero")]
    ZeroInterval,
}
