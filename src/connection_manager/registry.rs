use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::websocket::ServerMessage;

use super::stats::ConnectionStats;
use super::types::{ConnectionHandle, ConnectionId};

/// Tracks every live WebSocket connection by its identity
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection under a freshly assigned id
    pub fn register(&self, sender: mpsc::UnboundedSender<ServerMessage>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(ConnectionId::new(), sender));
        self.connections.insert(handle.id, handle.clone());

        tracing::info!(connection_id = %handle.id, "Connection registered");

        handle
    }

    /// Unregister a connection, returning its handle if it was still present
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let removed = self.connections.remove(&connection_id).map(|(_, handle)| handle);
        if removed.is_some() {
            tracing::info!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    /// Get connection by ID
    pub fn get(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&connection_id).map(|h| h.clone())
    }

    /// Deliver a message to a registered connection.
    /// Returns false if the id is unknown or its writer has gone away.
    pub fn deliver(&self, connection_id: ConnectionId, message: ServerMessage) -> bool {
        match self.connections.get(&connection_id) {
            Some(handle) => handle.send(message),
            None => false,
        }
    }

    /// Get all connections
    pub fn get_all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> ConnectionStats {
        let now = Utc::now();
        let oldest_connection_secs = self
            .connections
            .iter()
            .map(|entry| now.signed_duration_since(entry.value().connected_at).num_seconds())
            .max();

        ConnectionStats {
            total_connections: self.connections.len(),
            oldest_connection_secs,
        }
    }

    /// Find connections that have been inactive for longer than the timeout
    pub fn find_stale_connections(&self, timeout_secs: u64) -> Vec<ConnectionId> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(timeout_secs as i64);

        self.connections
            .iter()
            .filter(|entry| now.signed_duration_since(entry.value().last_activity()) > timeout)
            .map(|entry| *entry.key())
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
