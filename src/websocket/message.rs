use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection_manager::ConnectionId;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    #[serde(rename = "startChat")]
    StartChat,
    #[serde(rename = "nextPartner")]
    NextPartner,
    #[serde(rename = "stopChat")]
    StopChat,
    #[serde(rename = "offer")]
    Offer {
        offer: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    #[serde(rename = "answer")]
    Answer {
        answer: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    #[serde(rename = "ice-candidate")]
    IceCandidate {
        candidate: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    #[serde(rename = "ping")]
    Ping,
}

impl ClientMessage {
    /// Wire name of the message, used as a metrics label
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::StartChat => "startChat",
            ClientMessage::NextPartner => "nextPartner",
            ClientMessage::StopChat => "stopChat",
            ClientMessage::Offer { .. } => "offer",
            ClientMessage::Answer { .. } => "answer",
            ClientMessage::IceCandidate { .. } => "ice-candidate",
            ClientMessage::Ping => "ping",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: ConnectionId,
    },
    #[serde(rename = "waitingForPartner")]
    WaitingForPartner,
    #[serde(rename = "partnerFound")]
    PartnerFound {
        #[serde(rename = "partnerId")]
        partner_id: ConnectionId,
    },
    #[serde(rename = "partnerDisconnected")]
    PartnerDisconnected,
    #[serde(rename = "offer")]
    Offer { offer: Value, from: ConnectionId },
    #[serde(rename = "answer")]
    Answer { answer: Value, from: ConnectionId },
    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: Value, from: ConnectionId },
    #[serde(rename = "pong")]
    Pong,
    /// Written to the socket as a ping frame
    #[serde(rename = "heartbeat")]
    Heartbeat,
}

impl ServerMessage {
    pub fn partner_found(partner_id: ConnectionId) -> Self {
        Self::PartnerFound { partner_id }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
