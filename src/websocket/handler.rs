use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::connection_manager::ConnectionHandle;
use crate::hub::{ClientEvent, SignalingHub};
use crate::metrics::{ConnectionMetrics, WsMessageMetrics};
use crate::server::AppState;

use super::message::{ClientMessage, ServerMessage};

/// WebSocket upgrade handler
#[tracing::instrument(name = "ws.upgrade", skip(ws, state))]
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
#[tracing::instrument(name = "ws.connection", skip(socket, state))]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_start = std::time::Instant::now();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let handle = state.hub.connect(tx);
    let connection_id = handle.id;

    ConnectionMetrics::record_opened();
    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Task for sending messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = outbound_frame(msg) else {
                continue;
            };

            if ws_sender.send(frame).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    // Task for receiving messages from WebSocket
    let hub = state.hub.clone();
    let handle_clone = handle.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(msg) => {
                    if !process_message(msg, &hub, &handle_clone) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    let send_abort = send_task.abort_handle();
    let recv_abort = recv_task.abort_handle();

    // Wait for either task to complete or for the server to close us
    tokio::select! {
        _ = send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task completed");
        }
        _ = recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task completed");
        }
        _ = handle.closed() => {
            tracing::debug!(connection_id = %connection_id, "Connection closed by server");
        }
    }
    send_abort.abort();
    recv_abort.abort();

    // Transport-level disconnect
    state.hub.handle(connection_id, ClientEvent::Disconnect);

    let duration = connection_start.elapsed().as_secs_f64();
    ConnectionMetrics::record_closed(duration);

    tracing::info!(
        connection_id = %connection_id,
        duration_secs = duration,
        "WebSocket connection closed"
    );
}

/// Encode a queued server message as a WebSocket frame.
///
/// Heartbeats go out as protocol-level pings: clients answer them with a pong
/// without any application code, and the pong counts as activity.
fn outbound_frame(msg: ServerMessage) -> Option<Message> {
    if msg == ServerMessage::Heartbeat {
        return Some(Message::Ping(Bytes::new()));
    }

    match msg.to_json() {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Process a received WebSocket message
/// Returns false if the connection should be closed
fn process_message(msg: Message, hub: &SignalingHub, handle: &Arc<ConnectionHandle>) -> bool {
    match msg {
        Message::Text(text) => {
            handle.update_activity();

            let client_msg: ClientMessage = match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(e) => {
                    // Malformed requests are dropped; the connection stays up
                    WsMessageMetrics::record_malformed();
                    tracing::warn!(connection_id = %handle.id, error = %e, "Failed to parse client message");
                    return true;
                }
            };

            WsMessageMetrics::record_received(client_msg.name());
            tracing::debug!(connection_id = %handle.id, message_type = client_msg.name(), "Client message");
            hub.handle(handle.id, client_msg.into());
            true
        }
        Message::Binary(_) => {
            handle.update_activity();
            tracing::debug!(connection_id = %handle.id, "Ignoring binary frame");
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            // Axum answers pings itself; only activity needs tracking
            handle.update_activity();
            true
        }
        Message::Close(_) => {
            tracing::debug!(connection_id = %handle.id, "Received close frame");
            false
        }
    }
}
