use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::api_routes;
use crate::websocket::ws_handler;

use super::AppState;

/// Browsers reach the signaling socket and the read-only API from any origin
fn signaling_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Assemble the `/ws` signaling endpoint and the HTTP API
pub fn create_app(state: AppState) -> Router {
    let signaling = Router::new().route("/ws", get(ws_handler));

    signaling
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(signaling_cors())
        .with_state(state)
}
