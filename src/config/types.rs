//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_max_line_len, default_send_queue_len, default_true, default_welcome};
use super::faults::FaultConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
///
/// Every section is optional; an empty file yields a server on port 1337 with
/// all fault simulations disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server behaviour.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Network fault simulation.
    #[serde(default)]
    pub faults: FaultConfig,
    /// Group policy.
    #[serde(default)]
    pub groups: GroupsConfig,
    /// Log output format.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Text sent after `HELO` when a client connects.
    #[serde(default = "default_welcome")]
    pub welcome: String,
    /// Maximum inbound line length in bytes. Longer lines end the session.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Outbound lines a session may have queued. A client that falls this far
    /// behind is disconnected.
    #[serde(default = "default_send_queue_len")]
    pub send_queue_len: usize,
    /// Prometheus metrics HTTP port (disabled when unset).
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            max_line_len: default_max_line_len(),
            send_queue_len: default_send_queue_len(),
            metrics_port: None,
        }
    }
}

/// Group policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupsConfig {
    /// Reject NEWGROUP when a group with the same name (ignoring case) exists.
    #[serde(default)]
    pub unique_names: bool,
}

/// Log output configuration.
///
/// The filter itself comes from `RUST_LOG` (default `info`).
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Colourise console output.
    #[serde(default = "default_true")]
    pub ansi: bool,
    /// Emit one JSON object per event instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            ansi: true,
            json: false,
        }
    }
}
