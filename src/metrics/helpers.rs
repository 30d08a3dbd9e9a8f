//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::matchmaker::MatchStats;
use crate::relay::{RelayOutcome, SignalKind};

use super::{
    ACTIVE_PAIRS, CONNECTIONS_TOTAL, HEARTBEAT_DURATION_MS, PAIRING_STALE_SKIPPED_TOTAL,
    PAIRS_FORMED_TOTAL, RELAY_MESSAGES_TOTAL, STALE_CONNECTIONS_REMOVED, WAITING_POOL_SIZE,
    WS_CONNECTIONS_CLOSED, WS_CONNECTIONS_OPENED, WS_CONNECTION_DURATION, WS_MESSAGES_MALFORMED,
    WS_MESSAGES_RECEIVED,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for connection lifecycle metrics
pub struct ConnectionMetrics;

impl ConnectionMetrics {
    pub fn record_opened() {
        WS_CONNECTIONS_OPENED.inc();
        CONNECTIONS_TOTAL.inc();
    }

    pub fn record_closed(duration_secs: f64) {
        WS_CONNECTIONS_CLOSED.inc();
        CONNECTIONS_TOTAL.dec();
        WS_CONNECTION_DURATION.observe(duration_secs);
    }
}

/// Helper struct for WebSocket message metrics
pub struct WsMessageMetrics;

impl WsMessageMetrics {
    /// Record a parsed client message by its wire name
    pub fn record_received(message_type: &str) {
        WS_MESSAGES_RECEIVED
            .with_label_values(&[message_type])
            .inc();
    }

    /// Record a dropped, unparseable message
    pub fn record_malformed() {
        WS_MESSAGES_MALFORMED.inc();
    }
}

/// Helper struct for matchmaking metrics
pub struct MatchmakingMetrics;

impl MatchmakingMetrics {
    pub fn update_state(stats: &MatchStats) {
        WAITING_POOL_SIZE.set(stats.waiting as i64);
        ACTIVE_PAIRS.set(stats.active_pairs as i64);
    }

    pub fn record_pairs_formed(count: u64) {
        if count > 0 {
            PAIRS_FORMED_TOTAL.inc_by(count);
        }
    }

    pub fn record_stale_skipped(count: u64) {
        if count > 0 {
            PAIRING_STALE_SKIPPED_TOTAL.inc_by(count);
        }
    }
}

/// Helper struct for relay metrics
pub struct RelayMetrics;

impl RelayMetrics {
    pub fn record(kind: SignalKind, outcome: RelayOutcome) {
        RELAY_MESSAGES_TOTAL
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .inc();
    }
}

/// Helper struct for heartbeat metrics
pub struct HeartbeatMetrics;

impl HeartbeatMetrics {
    pub fn record_duration_ms(duration_ms: u64) {
        HEARTBEAT_DURATION_MS.observe(duration_ms as f64);
    }

    pub fn record_stale_removed(count: u64) {
        STALE_CONNECTIONS_REMOVED.inc_by(count);
    }
}
