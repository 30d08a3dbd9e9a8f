//! Event wiring between connections, the matchmaker and the relay.
//!
//! Each connection's reader feeds [`ClientEvent`]s to [`SignalingHub::handle`]
//! one at a time. Matchmaking events are serialized by the matchmaker lock;
//! relay events touch no shared matchmaking state.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::MatchmakingConfig;
use crate::connection_manager::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::matchmaker::Matchmaker;
use crate::relay::{SignalKind, SignalRelay};
use crate::websocket::{ClientMessage, ServerMessage};

/// Everything a connection can cause, transport-level disconnect included
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Start,
    Next,
    Stop,
    Relay {
        kind: SignalKind,
        to: Option<ConnectionId>,
        payload: Value,
    },
    Ping,
    Disconnect,
}

impl From<ClientMessage> for ClientEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::StartChat => ClientEvent::Start,
            ClientMessage::NextPartner => ClientEvent::Next,
            ClientMessage::StopChat => ClientEvent::Stop,
            ClientMessage::Offer { offer, to } => ClientEvent::Relay {
                kind: SignalKind::Offer,
                to,
                payload: offer,
            },
            ClientMessage::Answer { answer, to } => ClientEvent::Relay {
                kind: SignalKind::Answer,
                to,
                payload: answer,
            },
            ClientMessage::IceCandidate { candidate, to } => ClientEvent::Relay {
                kind: SignalKind::Candidate,
                to,
                payload: candidate,
            },
            ClientMessage::Ping => ClientEvent::Ping,
        }
    }
}

pub struct SignalingHub {
    registry: Arc<ConnectionRegistry>,
    matchmaker: Matchmaker,
    relay: SignalRelay,
}

impl SignalingHub {
    pub fn new(registry: Arc<ConnectionRegistry>, config: MatchmakingConfig) -> Self {
        Self {
            matchmaker: Matchmaker::new(registry.clone(), config),
            relay: SignalRelay::new(registry.clone()),
            registry,
        }
    }

    /// Register a new connection and tell it its identity
    pub fn connect(&self, sender: mpsc::UnboundedSender<ServerMessage>) -> Arc<ConnectionHandle> {
        let handle = self.registry.register(sender);
        handle.send(ServerMessage::Connected {
            connection_id: handle.id,
        });
        handle
    }

    pub fn handle(&self, id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Start => self.matchmaker.request_match(id),
            ClientEvent::Next => self.matchmaker.request_next(id),
            ClientEvent::Stop => self.matchmaker.request_stop(id),
            ClientEvent::Relay { kind, to, payload } => match to {
                Some(recipient) => {
                    self.relay.relay(kind, id, recipient, payload);
                }
                None => {
                    tracing::warn!(
                        connection_id = %id,
                        kind = kind.as_str(),
                        "Dropping relay request without recipient"
                    );
                }
            },
            ClientEvent::Ping => {
                self.registry.deliver(id, ServerMessage::Pong);
            }
            ClientEvent::Disconnect => self.disconnect(id),
        }
    }

    /// Tear down a connection: unregister it, ask its socket task to close,
    /// then purge it from matchmaking. Safe to call more than once.
    pub fn disconnect(&self, id: ConnectionId) {
        if let Some(handle) = self.registry.unregister(id) {
            handle.request_close();
        }
        self.matchmaker.on_disconnect(id);
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }
}
