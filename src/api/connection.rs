//! Connection inspection endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::connection_manager::ConnectionId;
use crate::error::{AppError, Result};
use crate::matchmaker::RoomLabel;
use crate::server::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Idle,
    Waiting,
    Paired,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStatusResponse {
    pub connection_id: ConnectionId,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<ConnectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomLabel>,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// GET /api/v1/connections/{connection_id} - Matchmaking status of a live connection
pub async fn get_connection(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ConnectionStatusResponse>> {
    let connection_id: ConnectionId = Uuid::parse_str(&raw_id)
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid connection id", raw_id)))?
        .into();

    let handle = state
        .connection_registry
        .get(connection_id)
        .ok_or_else(|| AppError::NotFound(format!("Connection '{}' is not connected", raw_id)))?;

    let matchmaker = state.hub.matchmaker();
    let partner_id = matchmaker.partner_of(connection_id);
    let status = if partner_id.is_some() {
        MatchStatus::Paired
    } else if matchmaker.is_waiting(connection_id) {
        MatchStatus::Waiting
    } else {
        MatchStatus::Idle
    };

    Ok(Json(ConnectionStatusResponse {
        connection_id,
        status,
        partner_id,
        room: matchmaker.room_of(connection_id),
        connected_at: handle.connected_at,
    }))
}
