//! In-memory HiveServer doubles.
//!
//! Used by `--mock` runs and by tests that need to observe how many sessions
//! were opened or closed without a server.

use super::{Connector, HiveClient, HiveServerException, Row};
use crate::config::ConnectionConfig;
use crate::error::{HiveError, Result};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A mock client that serves predefined rows.
///
/// Rows registered for an exact query text win over the default rows.
/// Clones share their counters and query log.
#[derive(Debug, Clone, Default)]
pub struct MockHiveClient {
    results: HashMap<String, Vec<Row>>,
    default_rows: Vec<Row>,
    pending: Option<VecDeque<Row>>,
    executed: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl MockHiveClient {
    /// Creates a mock client that returns no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock client that returns `rows` for every query.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            default_rows: rows,
            ..Self::default()
        }
    }

    /// Registers rows for one exact query text.
    pub fn with_result(mut self, query: impl Into<String>, rows: Vec<Row>) -> Self {
        self.results.insert(query.into(), rows);
        self
    }

    /// Loads default rows from a JSON file holding an array of rows.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HiveError::config(format!("Failed to read mock rows from {}: {e}", path.display()))
        })?;
        let rows: Vec<Row> = serde_json::from_str(&content).map_err(|e| {
            HiveError::config(format!("Invalid mock rows in {}: {e}", path.display()))
        })?;
        Ok(Self::with_rows(rows))
    }

    /// Queries executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn pending_rows(&mut self) -> Result<&mut VecDeque<Row>> {
        self.pending
            .as_mut()
            .ok_or_else(|| HiveError::remote_execution("No query has been executed"))
    }
}

impl HiveClient for MockHiveClient {
    fn execute(&mut self, query: &str) -> Result<()> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        let rows = self
            .results
            .get(query)
            .unwrap_or(&self.default_rows)
            .clone();
        self.pending = Some(rows.into());
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        Ok(self.pending_rows()?.drain(..).collect())
    }

    fn fetch_n(&mut self, num_rows: i32) -> Result<Vec<Row>> {
        let pending = self.pending_rows()?;
        let take = (num_rows.max(0) as usize).min(pending.len());
        Ok(pending.drain(..take).collect())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock client whose queries always fail on the server side.
#[derive(Debug, Clone)]
pub struct FailingHiveClient {
    exception: HiveServerException,
}

impl FailingHiveClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            exception: HiveServerException::new(message, 40000, "42000"),
        }
    }
}

impl HiveClient for FailingHiveClient {
    fn execute(&mut self, _query: &str) -> Result<()> {
        Err(HiveError::remote_execution(self.exception.clone()))
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        Err(HiveError::remote_execution(self.exception.clone()))
    }

    fn fetch_n(&mut self, _num_rows: i32) -> Result<Vec<Row>> {
        Err(HiveError::remote_execution(self.exception.clone()))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Hands out clones of a prototype client and counts the sessions opened.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    client: MockHiveClient,
    failing: Option<String>,
    opens: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Creates a connector serving sessions backed by `client`.
    pub fn new(client: MockHiveClient) -> Self {
        Self {
            client,
            ..Self::default()
        }
    }

    /// Creates a connector whose sessions fail every query with `message`.
    pub fn failing_queries(message: impl Into<String>) -> Self {
        Self {
            failing: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of sessions opened so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of sessions closed so far.
    pub fn close_count(&self) -> usize {
        self.client.close_count()
    }

    /// Queries executed across all sessions, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.client.executed_queries()
    }
}

impl Connector for MockConnector {
    fn open(&self, _config: &ConnectionConfig) -> Result<Box<dyn HiveClient>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match &self.failing {
            Some(message) => Ok(Box::new(FailingHiveClient::new(message.clone()))),
            None => {
                let mut client = self.client.clone();
                client.pending = None;
                Ok(Box::new(client))
            }
        }
    }
}

/// A connector that can never reach its server.
#[derive(Debug, Clone, Default)]
pub struct FailingConnector {
    attempts: Arc<AtomicUsize>,
}

impl FailingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connection attempts made so far.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for FailingConnector {
    fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn HiveClient>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(HiveError::connection(
            config.address(),
            io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
        ))
    }
}
