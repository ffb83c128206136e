//! Query building and execution for hive-indexer.
//!
//! This module isolates query templating and execution from the
//! command-line flow.

pub mod executor;
pub mod template;

pub use executor::QueryExecutor;
pub use template::{checked_offset_query, offset_query, RawTemplate, OFFSET_QUERY};
