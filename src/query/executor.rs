//! Query execution over a connected session.
//!
//! Provides isolated query execution that can be tested independently
//! of the command-line flow.

use std::io::Write;
use std::time::Instant;

use tracing::{debug, info};

use crate::connection::ConnectionManager;
use crate::db::Row;
use crate::error::Result;

/// Runs queries on a [`ConnectionManager`]'s session.
///
/// Every query is echoed as `hive> <query>;` to the echo sink before it is
/// sent.
pub struct QueryExecutor<'a, W: Write> {
    manager: &'a mut ConnectionManager,
    echo: W,
}

impl<'a, W: Write> QueryExecutor<'a, W> {
    /// Creates a new query executor.
    pub fn new(manager: &'a mut ConnectionManager, echo: W) -> Self {
        Self { manager, echo }
    }

    /// Executes `query` and fetches its rows.
    ///
    /// A `limit` of zero or less fetches every row; a positive `limit`
    /// fetches at most that many. Fails with `NotConnected` before any I/O
    /// when the session is not connected.
    pub fn execute(&mut self, query: &str, limit: i32) -> Result<Vec<Row>> {
        let client = self.manager.client_mut()?;

        writeln!(self.echo, "hive> {query};")?;
        self.echo.flush()?;

        let start = Instant::now();
        client.execute(query)?;
        debug!("Query accepted, fetching rows (limit {})", limit);

        let rows = if limit <= 0 {
            client.fetch_all()?
        } else {
            client.fetch_n(limit)?
        };

        info!(
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query finished"
        );
        Ok(rows)
    }
}
