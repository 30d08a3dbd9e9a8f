//! Connection statistics

use serde::Serialize;

/// Connection statistics
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStats {
    pub total_connections: usize,
    /// Seconds the oldest live connection has been open
    pub oldest_connection_secs: Option<i64>,
}
