//! Prometheus metrics for the pairing relay.
//!
//! - Connection metrics (active connections, opened/closed, lifetime)
//! - WebSocket message metrics by type
//! - Matchmaking metrics (pool size, active pairs, pairs formed, skipped pairings)
//! - Relay metrics by kind and outcome
//! - Heartbeat metrics

mod helpers;

pub use helpers::{
    encode_metrics, ConnectionMetrics, HeartbeatMetrics, MatchmakingMetrics, RelayMetrics,
    WsMessageMetrics,
};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "pairchat";

lazy_static! {
    // ============================================================================
    // Connection Metrics
    // ============================================================================

    /// Total number of active WebSocket connections
    pub static ref CONNECTIONS_TOTAL: IntGauge = register_int_gauge!(
        format!("{}_connections_total", METRIC_PREFIX),
        "Total number of active WebSocket connections"
    ).unwrap();

    /// Total WebSocket connections opened
    pub static ref WS_CONNECTIONS_OPENED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_opened_total", METRIC_PREFIX),
        "Total WebSocket connections opened"
    ).unwrap();

    /// Total WebSocket connections closed
    pub static ref WS_CONNECTIONS_CLOSED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_closed_total", METRIC_PREFIX),
        "Total WebSocket connections closed"
    ).unwrap();

    /// WebSocket connection lifetime
    pub static ref WS_CONNECTION_DURATION: Histogram = register_histogram!(
        format!("{}_ws_connection_duration_seconds", METRIC_PREFIX),
        "WebSocket connection duration in seconds",
        vec![1.0, 10.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0]
    ).unwrap();

    /// WebSocket messages received by type
    pub static ref WS_MESSAGES_RECEIVED: IntCounterVec = register_int_counter_vec!(
        format!("{}_ws_messages_received_total", METRIC_PREFIX),
        "Total WebSocket messages received from clients",
        &["type"]
    ).unwrap();

    /// Text frames that could not be parsed into a client message
    pub static ref WS_MESSAGES_MALFORMED: IntCounter = register_int_counter!(
        format!("{}_ws_messages_malformed_total", METRIC_PREFIX),
        "Total malformed WebSocket messages dropped"
    ).unwrap();

    // ============================================================================
    // Matchmaking Metrics
    // ============================================================================

    /// Connections currently waiting for a partner
    pub static ref WAITING_POOL_SIZE: IntGauge = register_int_gauge!(
        format!("{}_waiting_pool_size", METRIC_PREFIX),
        "Number of connections waiting for a partner"
    ).unwrap();

    /// Partnerships currently active
    pub static ref ACTIVE_PAIRS: IntGauge = register_int_gauge!(
        format!("{}_active_pairs", METRIC_PREFIX),
        "Number of active partnerships"
    ).unwrap();

    /// Total partnerships formed
    pub static ref PAIRS_FORMED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_pairs_formed_total", METRIC_PREFIX),
        "Total partnerships formed"
    ).unwrap();

    /// Pairing attempts abandoned because a side had disconnected
    pub static ref PAIRING_STALE_SKIPPED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_pairing_stale_skipped_total", METRIC_PREFIX),
        "Total pairing attempts skipped due to a vanished connection"
    ).unwrap();

    // ============================================================================
    // Relay Metrics
    // ============================================================================

    /// Relayed signaling messages by kind and outcome
    pub static ref RELAY_MESSAGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_relay_messages_total", METRIC_PREFIX),
        "Total signaling messages relayed",
        &["kind", "outcome"]
    ).unwrap();

    // ============================================================================
    // Heartbeat Metrics
    // ============================================================================

    /// Heartbeat round duration
    pub static ref HEARTBEAT_DURATION_MS: Histogram = register_histogram!(
        format!("{}_heartbeat_duration_ms", METRIC_PREFIX),
        "Duration of a heartbeat round in milliseconds",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]
    ).unwrap();

    /// Connections removed by stale cleanup
    pub static ref STALE_CONNECTIONS_REMOVED: IntCounter = register_int_counter!(
        format!("{}_stale_connections_removed_total", METRIC_PREFIX),
        "Total connections removed for inactivity"
    ).unwrap();
}
