//! Connection manager for the HiveServer session lifecycle.

use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::db::{Connector, HiveClient, ThriftConnector};
use crate::error::{HiveError, Result};

/// Whether the session currently holds a client.
enum SessionState {
    Disconnected,
    Connected(Box<dyn HiveClient>),
}

/// Owns a single RPC session to HiveServer.
///
/// A manager starts disconnected. `connect` opens a client through its
/// [`Connector`]; `disconnect` (or dropping the manager) closes it again.
pub struct ConnectionManager {
    config: ConnectionConfig,
    connector: Box<dyn Connector>,
    state: SessionState,
}

impl ConnectionManager {
    /// Creates a disconnected manager that talks Thrift to `config`.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(config, ThriftConnector)
    }

    /// Creates a disconnected manager that opens sessions with `connector`.
    pub fn with_connector(config: ConnectionConfig, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            state: SessionState::Disconnected,
        }
    }

    /// Connects to the configured server. Does nothing if already connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected to {}", self.config.address());
            return Ok(());
        }

        info!("Connecting to {}", self.config.display_string());
        let client = self.connector.open(&self.config)?;
        self.state = SessionState::Connected(client);
        info!("Connected to {}", self.config.address());

        Ok(())
    }

    /// Drops the session and closes its transport.
    ///
    /// The manager is disconnected afterwards even when closing fails; the
    /// close error is still returned.
    pub fn disconnect(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Connected(mut client) => {
                debug!("Disconnecting from {}", self.config.address());
                client.close()
            }
            SessionState::Disconnected => Ok(()),
        }
    }

    /// Check if there's an active session.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// Get the connected client, or `NotConnected`.
    pub fn client_mut(&mut self) -> Result<&mut dyn HiveClient> {
        match &mut self.state {
            SessionState::Connected(client) => Ok(client.as_mut()),
            SessionState::Disconnected => Err(HiveError::NotConnected),
        }
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            warn!("Failed to close connection to {}: {}", self.config.address(), e);
        }
    }
}
