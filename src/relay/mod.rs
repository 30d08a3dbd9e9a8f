//! Blind point-to-point relay of session negotiation messages.
//!
//! Payloads are never inspected. The only check is whether the recipient is
//! still registered; if not, the message is dropped without telling anyone.

use std::sync::Arc;

use serde_json::Value;

use crate::connection_manager::{ConnectionId, ConnectionRegistry};
use crate::metrics::RelayMetrics;
use crate::websocket::ServerMessage;

/// The three negotiation message kinds the relay forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "ice-candidate",
        }
    }

    /// Wrap a payload in the server event of the same kind
    fn into_message(self, payload: Value, from: ConnectionId) -> ServerMessage {
        match self {
            SignalKind::Offer => ServerMessage::Offer { offer: payload, from },
            SignalKind::Answer => ServerMessage::Answer { answer: payload, from },
            SignalKind::Candidate => ServerMessage::IceCandidate {
                candidate: payload,
                from,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    /// Recipient not registered (or its writer already closed)
    Dropped,
}

impl RelayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::Delivered => "delivered",
            RelayOutcome::Dropped => "dropped",
        }
    }
}

pub struct SignalRelay {
    registry: Arc<ConnectionRegistry>,
}

impl SignalRelay {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn relay(
        &self,
        kind: SignalKind,
        sender: ConnectionId,
        recipient: ConnectionId,
        payload: Value,
    ) -> RelayOutcome {
        let outcome = if self.registry.deliver(recipient, kind.into_message(payload, sender)) {
            RelayOutcome::Delivered
        } else {
            RelayOutcome::Dropped
        };

        RelayMetrics::record(kind, outcome);
        tracing::debug!(
            kind = kind.as_str(),
            from = %sender,
            to = %recipient,
            outcome = outcome.as_str(),
            "Relayed signaling message"
        );

        outcome
    }
}
