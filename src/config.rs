//! Configuration management for hive-indexer.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named HiveServer connections.

use crate::error::{HiveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Host used when nothing else names one.
pub const DEFAULT_HOST: &str = "localhost";

/// HiveServer Thrift port used when nothing else names one.
pub const DEFAULT_PORT: u16 = 10000;

/// Main configuration structure for hive-indexer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Named HiveServer connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Query settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueryConfig {
    /// Validate table and column identifiers before substituting them.
    #[serde(default)]
    pub validate: bool,
}

/// HiveServer connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host.
    pub host: Option<String>,

    /// Server Thrift port.
    pub port: Option<u16>,

    /// Seconds to wait for the TCP connection before giving up.
    pub connect_timeout_secs: Option<u64>,

    /// Seconds to wait for each execute/fetch reply before giving up.
    pub fetch_timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    /// Creates a config pointing at the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Default::default()
        }
    }

    /// Creates a new connection config from a connection string.
    ///
    /// Format: `hive://host:port` (or `thrift://host:port`)
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let url = Url::parse(conn_str)
            .map_err(|e| HiveError::config(format!("Invalid connection string: {e}")))?;

        if url.scheme() != "hive" && url.scheme() != "thrift" {
            return Err(HiveError::config(format!(
                "Invalid scheme '{}'. Expected 'hive' or 'thrift'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .map(String::from)
            .ok_or_else(|| HiveError::config("Connection string is missing a host"))?;

        Ok(Self {
            host: Some(host),
            port: url.port(),
            ..Default::default()
        })
    }

    /// Returns the host, falling back to [`DEFAULT_HOST`].
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Returns the port, falling back to [`DEFAULT_PORT`].
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns the `host:port` pair used for logging and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }

    /// Rejects settings no connection could use.
    ///
    /// A zero timeout cannot be applied to a socket; leave it unset to wait
    /// indefinitely.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
        ] {
            if secs == Some(0) {
                return Err(HiveError::config(format!(
                    "{name} must be at least 1 second (omit it to wait indefinitely)"
                )));
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionConfig) {
        if other.host.is_some() {
            self.host = other.host.clone();
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.connect_timeout_secs.is_some() {
            self.connect_timeout_secs = other.connect_timeout_secs;
        }
        if other.fetch_timeout_secs.is_some() {
            self.fetch_timeout_secs = other.fetch_timeout_secs;
        }
    }

    /// Applies environment variables (HIVE_HOST, HIVE_PORT) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.host.is_none() {
            self.host = lookup("HIVE_HOST");
        }
        if self.port.is_none() {
            if let Some(port_str) = lookup("HIVE_PORT") {
                match port_str.parse() {
                    Ok(port) => self.port = Some(port),
                    Err(_) => warn!("Ignoring invalid HIVE_PORT value: {}", port_str),
                }
            }
        }
    }

    /// Returns a display string for logs.
    pub fn display_string(&self) -> String {
        format!("hive://{}", self.address())
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hive-indexer")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| HiveError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            HiveError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
