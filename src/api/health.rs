//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::connection_manager::ConnectionStats;
use crate::matchmaker::MatchStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub connections: usize,
    pub waiting: usize,
    pub active_pairs: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub connections: ConnectionStats,
    pub matchmaking: MatchStats,
    pub settings: MatchmakingSettings,
}

#[derive(Debug, Serialize)]
pub struct MatchmakingSettings {
    pub requeue_partner_on_stop: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let match_stats = state.hub.matchmaker().stats();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        connections: state.connection_registry.len(),
        waiting: match_stats.waiting,
        active_pairs: match_stats.active_pairs,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        connections: state.connection_registry.stats(),
        matchmaking: state.hub.matchmaker().stats(),
        settings: MatchmakingSettings {
            requeue_partner_on_stop: state.settings.matchmaking.requeue_partner_on_stop,
        },
    })
}
