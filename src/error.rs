//! Error types for hive-indexer.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Boxed cause carried by errors that wrap a lower-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for hive-indexer operations.
#[derive(Error, Debug)]
pub enum HiveError {
    /// Transport or protocol failure while opening a session.
    #[error("Failed to connect to Thrift server at {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },

    /// An operation was issued before a successful connect.
    #[error("Client is not connected to any Thrift server")]
    NotConnected,

    /// The server rejected or failed the query, or the fetch broke down.
    #[error("Remote execution failed: {source}")]
    RemoteExecution {
        #[source]
        source: BoxError,
    },

    /// Malformed command-line invocation. Holds the rendered usage text.
    #[error("{0}")]
    Usage(String),

    /// Query text could not be built or failed identifier validation.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration errors (invalid config file, bad connection URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing the echo line or the results failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HiveError {
    /// Creates a connection error for `target` wrapping `source`.
    pub fn connection(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Creates a remote execution error wrapping `source`.
    pub fn remote_execution(source: impl Into<BoxError>) -> Self {
        Self::RemoteExecution {
            source: source.into(),
        }
    }

    /// Creates a usage error with the given message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates an invalid query error with the given message.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "Connection Error",
            Self::NotConnected => "Not Connected",
            Self::RemoteExecution { .. } => "Remote Execution Error",
            Self::Usage(_) => "Usage Error",
            Self::InvalidQuery(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias using HiveError.
pub type Result<T> = std::result::Result<T, HiveError>;
