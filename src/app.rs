//! The offset query flow: build the query, connect, execute, print.

use std::io::Write;

use tracing::{info, warn};

use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::output::{self, OutputFormat};
use crate::query::{checked_offset_query, offset_query, QueryExecutor};

/// What to query and how to print it.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub table: String,
    pub column: String,
    /// Row limit; zero or less fetches everything.
    pub limit: i32,
    pub format: OutputFormat,
    /// Refuse table or column names that are not plain identifiers.
    pub validate: bool,
}

impl RunOptions {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            ..Default::default()
        }
    }

    /// Renders the query these options describe.
    pub fn query(&self) -> Result<String> {
        if self.validate {
            checked_offset_query(&self.table, &self.column)
        } else {
            offset_query(&self.table, &self.column)
        }
    }
}

/// Runs the offset query on `manager`, writing the echo line, the rows and
/// the completion marker to `out`. Returns the number of rows printed.
///
/// The query is built before connecting, so a rejected identifier never
/// touches the network.
pub fn run<W: Write>(manager: &mut ConnectionManager, options: &RunOptions, out: &mut W) -> Result<usize> {
    let query = options.query()?;

    manager.connect()?;
    let rows = QueryExecutor::new(manager, &mut *out).execute(&query, options.limit)?;
    output::write_rows(out, &rows, options.format)?;

    if let Err(e) = manager.disconnect() {
        warn!("Failed to close connection to {}: {}", manager.config().address(), e);
    }

    info!("Printed {} rows for {}.{}", rows.len(), options.table, options.column);
    Ok(rows.len())
}
