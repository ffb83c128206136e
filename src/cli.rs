//! Command-line argument parsing for hive-indexer.
//!
//! Uses clap to parse the table and column to index plus connection and
//! output options.

use crate::config::ConnectionConfig;
use crate::error::{HiveError, Result};
use crate::output::OutputFormat;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Collects per-file block offsets of a Hive column through HiveServer.
#[derive(Parser, Debug)]
#[command(name = "hive-indexer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Table to scan
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// Column to group offsets by
    #[arg(value_name = "COLUMN")]
    pub column: String,

    /// HiveServer connection string (e.g., hive://host:10000)
    #[arg(long, value_name = "URL", env = "HIVE_URL")]
    pub url: Option<String>,

    /// HiveServer host
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// HiveServer Thrift port
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fetch at most N rows (0 fetches all)
    #[arg(short = 'n', long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    pub limit: i32,

    /// Output format (text or json)
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Refuse table or column names that are not plain identifiers
    #[arg(long)]
    pub validate: bool,

    /// Seconds to wait for the TCP connection
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: Option<u64>,

    /// Seconds to wait for each reply from the server
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout: Option<u64>,

    /// Serve rows from a JSON file instead of a server (for testing)
    #[arg(long, value_name = "PATH")]
    pub mock: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses the process arguments.
    ///
    /// `--help` and `--version` print and exit here; every other parse
    /// failure becomes a `Usage` error.
    pub fn parse_args() -> Result<Self> {
        Self::try_parse_args(std::env::args_os())
    }

    /// Parses arguments from an iterator, program name first.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => HiveError::usage(e.render().to_string().trim_end()),
        })
    }

    /// Converts CLI arguments to a ConnectionConfig.
    ///
    /// This creates a config from CLI args only, without merging with file config.
    pub fn to_connection_config(&self) -> Result<Option<ConnectionConfig>> {
        let mut config = match &self.url {
            Some(url) => ConnectionConfig::from_connection_string(url)?,
            None => ConnectionConfig::default(),
        };

        // Individual flags refine the connection string.
        if self.host.is_some() {
            config.host = self.host.clone();
        }
        if self.port.is_some() {
            config.port = self.port;
        }

        if config == ConnectionConfig::default() {
            return Ok(None);
        }
        Ok(Some(config))
    }

    /// Timeouts given on the command line, as a partial config to merge.
    pub fn timeout_overrides(&self) -> ConnectionConfig {
        ConnectionConfig {
            connect_timeout_secs: self.connect_timeout,
            fetch_timeout_secs: self.fetch_timeout,
            ..Default::default()
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> Result<OutputFormat> {
        self.format.parse().map_err(HiveError::usage)
    }
}
