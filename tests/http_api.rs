//! HTTP endpoint tests against the assembled router

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_test::assert_ok;
use tower::ServiceExt;

use pairchat_relay::config::Settings;
use pairchat_relay::server::{create_app, AppState};

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = assert_ok!(app.oneshot(request).await);
    let status = response.status();
    let bytes = assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        assert_ok!(serde_json::from_slice(&bytes))
    };
    (status, body)
}

#[tokio::test]
async fn test_health_reports_counts() {
    let state = AppState::new(Settings::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = state.hub.connect(tx);
    state.hub.matchmaker().request_match(handle.id);

    let (status, body) = get_json(create_app(state), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 1);
    assert_eq!(body["waiting"], 1);
    assert_eq!(body["active_pairs"], 0);
}

#[tokio::test]
async fn test_connection_status_for_paired_connection() {
    let state = AppState::new(Settings::default());
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let a = state.hub.connect(tx_a);
    let b = state.hub.connect(tx_b);
    state.hub.matchmaker().request_match(a.id);
    state.hub.matchmaker().request_match(b.id);

    let uri = format!("/api/v1/connections/{}", a.id);
    let (status, body) = get_json(create_app(state), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paired");
    assert_eq!(body["partner_id"], b.id.to_string());
    assert!(body["room"].as_str().unwrap().starts_with("room_"));
}

#[tokio::test]
async fn test_connection_status_errors() {
    let state = AppState::new(Settings::default());

    let (status, body) = get_json(create_app(state.clone()), "/api/v1/connections/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].is_string());

    let uri = format!("/api/v1/connections/{}", uuid::Uuid::new_v4());
    let (status, _) = get_json(create_app(state), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_exposes_matchmaking_settings() {
    let mut settings = Settings::default();
    settings.matchmaking.requeue_partner_on_stop = true;
    let state = AppState::new(settings);

    let (status, body) = get_json(create_app(state), "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["requeue_partner_on_stop"], true);
    assert_eq!(body["matchmaking"]["total_pairs_formed"], 0);
    assert_eq!(body["connections"]["total_connections"], 0);
}
