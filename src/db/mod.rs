//! Remote query service layer for hive-indexer.
//!
//! Provides a trait-based interface over the HiveServer RPC calls the client
//! relies on, so the Thrift implementation and in-memory doubles can be used
//! interchangeably.

mod mock;
mod thrift_hive;
mod types;

pub use mock::{FailingConnector, FailingHiveClient, MockConnector, MockHiveClient};
pub use thrift_hive::{ThriftConnector, ThriftHiveClient};
pub use types::{split_row, HiveServerException, Row, Value, COLUMN_SEPARATOR};

use crate::config::ConnectionConfig;
use crate::error::Result;

/// Trait defining the calls a connected session can make.
///
/// `execute` runs the query on the server; the fetch calls pull rows from the
/// result of the last executed query.
pub trait HiveClient: Send {
    /// Executes a query on the server without fetching any rows.
    fn execute(&mut self, query: &str) -> Result<()>;

    /// Fetches all remaining rows of the last executed query.
    fn fetch_all(&mut self) -> Result<Vec<Row>>;

    /// Fetches at most `num_rows` rows of the last executed query.
    fn fetch_n(&mut self, num_rows: i32) -> Result<Vec<Row>>;

    /// Releases the underlying transport.
    fn close(&mut self) -> Result<()>;
}

/// Opens clients for a connection configuration.
pub trait Connector: Send {
    /// Opens a new session to the configured server.
    fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn HiveClient>>;
}
