//! Connection identity and per-connection handle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::websocket::ServerMessage;

/// Opaque identity of a live connection, assigned at upgrade time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle for a single WebSocket connection
pub struct ConnectionHandle {
    pub id: ConnectionId,
    sender: mpsc::UnboundedSender<ServerMessage>,
    pub connected_at: DateTime<Utc>,
    /// Last activity timestamp (Unix seconds) - using AtomicI64 for lock-free updates
    last_activity: AtomicI64,
    close: Notify,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        let now = Utc::now();
        Self {
            id,
            sender,
            connected_at: now,
            last_activity: AtomicI64::new(now.timestamp()),
            close: Notify::new(),
        }
    }

    pub fn update_activity(&self) {
        self.last_activity
            .store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.last_activity.load(Ordering::Relaxed), 0)
            .unwrap_or_else(Utc::now)
    }

    /// Queue a message for the socket writer. Never blocks; returns false
    /// once the writer side has gone away.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Ask the socket task owning this connection to close it
    pub fn request_close(&self) {
        self.close.notify_one();
    }

    /// Resolves once `request_close` has been called
    pub async fn closed(&self) {
        self.close.notified().await;
    }

    #[cfg(test)]
    pub(crate) fn set_last_activity(&self, at: DateTime<Utc>) {
        self.last_activity.store(at.timestamp(), Ordering::Relaxed);
    }
}
