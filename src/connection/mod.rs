//! Connection management for hive-indexer.
//!
//! Centralizes the session lifecycle.

pub mod manager;

pub use manager::ConnectionManager;
