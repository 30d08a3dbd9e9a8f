//! End-to-end matchmaking and relay tests
//!
//! These drive the signaling hub the way the WebSocket handler does, with
//! in-memory channels standing in for sockets.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use pairchat_relay::config::MatchmakingConfig;
use pairchat_relay::connection_manager::{ConnectionId, ConnectionRegistry};
use pairchat_relay::hub::{ClientEvent, SignalingHub};
use pairchat_relay::relay::SignalKind;
use pairchat_relay::websocket::{ClientMessage, ServerMessage};

struct TestClient {
    id: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    fn connect(hub: &SignalingHub) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = hub.connect(tx);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Connected {
                connection_id: handle.id
            }
        );
        Self { id: handle.id, rx }
    }

    fn send(&self, hub: &SignalingHub, raw: serde_json::Value) {
        let msg: ClientMessage = serde_json::from_value(raw).expect("valid client message");
        hub.handle(self.id, msg.into());
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    fn partner_found_count(messages: &[ServerMessage]) -> usize {
        messages
            .iter()
            .filter(|m| matches!(m, ServerMessage::PartnerFound { .. }))
            .count()
    }
}

fn create_hub() -> SignalingHub {
    SignalingHub::new(Arc::new(ConnectionRegistry::new()), MatchmakingConfig::default())
}

mod matching_tests {
    use super::*;

    #[test]
    fn test_four_users_pair_in_arrival_order() {
        let hub = create_hub();
        let mut users: Vec<TestClient> = (0..4).map(|_| TestClient::connect(&hub)).collect();

        for user in &users {
            user.send(&hub, json!({"type": "startChat"}));
        }

        let ids: Vec<ConnectionId> = users.iter().map(|u| u.id).collect();
        let expected_partner = [ids[1], ids[0], ids[3], ids[2]];

        for (user, partner) in users.iter_mut().zip(expected_partner) {
            let messages = user.drain();
            assert_eq!(TestClient::partner_found_count(&messages), 1);
            assert!(messages.contains(&ServerMessage::partner_found(partner)));
        }

        let matchmaker = hub.matchmaker();
        assert_eq!(matchmaker.partner_of(ids[0]), Some(ids[1]));
        assert_eq!(matchmaker.partner_of(ids[2]), Some(ids[3]));
        assert_ne!(matchmaker.partner_of(ids[0]), Some(ids[2]));
        assert!(matchmaker.invariants_hold());
    }

    #[test]
    fn test_disconnected_waiter_does_not_cost_survivor_its_place() {
        let hub = create_hub();
        let b = TestClient::connect(&hub);
        b.send(&hub, json!({"type": "startChat"}));

        // B's socket is gone from the registry but its disconnect event has
        // not been processed yet
        hub.registry().unregister(b.id);

        let a = TestClient::connect(&hub);
        a.send(&hub, json!({"type": "startChat"}));
        assert_eq!(hub.matchmaker().waiting_ids(), vec![a.id]);

        let mut c = TestClient::connect(&hub);
        c.send(&hub, json!({"type": "startChat"}));
        assert_eq!(hub.matchmaker().partner_of(c.id), Some(a.id));
        assert!(c.drain().contains(&ServerMessage::partner_found(a.id)));

        // Late disconnect for B is harmless
        hub.handle(b.id, ClientEvent::Disconnect);
        assert_eq!(hub.matchmaker().partner_of(a.id), Some(c.id));
    }

    #[test]
    fn test_next_partner_requeues_both_sides() {
        let hub = create_hub();
        let mut a = TestClient::connect(&hub);
        let mut b = TestClient::connect(&hub);
        let mut c = TestClient::connect(&hub);

        a.send(&hub, json!({"type": "startChat"}));
        b.send(&hub, json!({"type": "startChat"}));
        a.drain();
        b.drain();

        a.send(&hub, json!({"type": "nextPartner"}));

        // No one else waiting: A and B rematch
        let b_messages = b.drain();
        assert_eq!(
            b_messages
                .iter()
                .filter(|m| **m == ServerMessage::PartnerDisconnected)
                .count(),
            1
        );
        assert_eq!(hub.matchmaker().partner_of(a.id), Some(b.id));
        a.drain();

        // With C waiting, B (re-queued first) gets C and A waits
        c.send(&hub, json!({"type": "startChat"}));
        assert_eq!(c.drain(), vec![ServerMessage::WaitingForPartner]);
        a.send(&hub, json!({"type": "nextPartner"}));

        assert_eq!(hub.matchmaker().partner_of(c.id), Some(b.id));
        assert!(hub.matchmaker().is_waiting(a.id));
        assert_eq!(a.drain(), vec![ServerMessage::WaitingForPartner]);
        assert_eq!(
            b.drain(),
            vec![
                ServerMessage::PartnerDisconnected,
                ServerMessage::partner_found(c.id)
            ]
        );
    }

    #[test]
    fn test_stop_chat_leaves_partner_idle() {
        let hub = create_hub();
        let mut a = TestClient::connect(&hub);
        let mut b = TestClient::connect(&hub);
        a.send(&hub, json!({"type": "startChat"}));
        b.send(&hub, json!({"type": "startChat"}));
        a.drain();
        b.drain();

        a.send(&hub, json!({"type": "stopChat"}));

        assert_eq!(b.drain(), vec![ServerMessage::PartnerDisconnected]);
        assert!(a.drain().is_empty());
        assert!(!hub.matchmaker().is_waiting(a.id));
        assert!(!hub.matchmaker().is_waiting(b.id));
        assert_eq!(hub.matchmaker().stats().active_pairs, 0);
    }

    #[test]
    fn test_disconnect_purges_connection() {
        let hub = create_hub();
        let a = TestClient::connect(&hub);
        let mut b = TestClient::connect(&hub);
        a.send(&hub, json!({"type": "startChat"}));
        b.send(&hub, json!({"type": "startChat"}));
        b.drain();

        hub.handle(a.id, ClientEvent::Disconnect);

        assert_eq!(b.drain(), vec![ServerMessage::PartnerDisconnected]);
        assert!(!hub.registry().contains(a.id));

        // Events arriving after the disconnect are ignored
        hub.handle(a.id, ClientEvent::Start);
        assert!(!hub.matchmaker().is_waiting(a.id));
        assert!(hub.matchmaker().invariants_hold());
    }
}

mod relay_tests {
    use super::*;

    fn paired_clients(hub: &SignalingHub) -> (TestClient, TestClient) {
        let mut a = TestClient::connect(hub);
        let mut b = TestClient::connect(hub);
        a.send(hub, json!({"type": "startChat"}));
        b.send(hub, json!({"type": "startChat"}));
        a.drain();
        b.drain();
        (a, b)
    }

    #[test]
    fn test_offer_answer_and_candidates_relayed_in_order() {
        let hub = create_hub();
        let (mut u1, mut u2) = paired_clients(&hub);

        let offer = json!({"type": "offer", "sdp": "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=-\r\n"});
        u1.send(&hub, json!({"type": "offer", "payload": {"offer": offer, "to": u2.id}}));
        assert_eq!(
            u2.drain(),
            vec![ServerMessage::Offer {
                offer: offer.clone(),
                from: u1.id
            }]
        );

        let answer = json!({"type": "answer", "sdp": "v=0\r\no=- 3 4 IN IP4 127.0.0.1\r\n"});
        u2.send(&hub, json!({"type": "answer", "payload": {"answer": answer, "to": u1.id}}));
        assert_eq!(
            u1.drain(),
            vec![ServerMessage::Answer {
                answer: answer.clone(),
                from: u2.id
            }]
        );

        let candidates: Vec<serde_json::Value> = (0..3)
            .map(|i| json!({"candidate": format!("candidate:{} 1 udp 2122260223 10.0.0.{} 5000{} typ host", i, i, i), "sdpMLineIndex": 0}))
            .collect();
        for candidate in &candidates {
            u1.send(
                &hub,
                json!({"type": "ice-candidate", "payload": {"candidate": candidate, "to": u2.id}}),
            );
        }

        let expected: Vec<ServerMessage> = candidates
            .into_iter()
            .map(|candidate| ServerMessage::IceCandidate {
                candidate,
                from: u1.id,
            })
            .collect();
        assert_eq!(u2.drain(), expected);
    }

    #[test]
    fn test_relay_to_vanished_recipient_is_silent() {
        let hub = create_hub();
        let (mut u1, u2) = paired_clients(&hub);
        let gone = u2.id;
        hub.handle(gone, ClientEvent::Disconnect);
        u1.drain();

        hub.handle(
            u1.id,
            ClientEvent::Relay {
                kind: SignalKind::Offer,
                to: Some(gone),
                payload: json!({"sdp": "late"}),
            },
        );

        assert!(u1.drain().is_empty());
    }

    #[test]
    fn test_relay_is_identity_routed_not_partner_routed() {
        let hub = create_hub();
        let u1 = TestClient::connect(&hub);
        let mut stranger = TestClient::connect(&hub);

        u1.send(
            &hub,
            json!({"type": "ice-candidate", "payload": {"candidate": {"candidate": "x"}, "to": stranger.id}}),
        );

        assert_eq!(
            stranger.drain(),
            vec![ServerMessage::IceCandidate {
                candidate: json!({"candidate": "x"}),
                from: u1.id
            }]
        );
    }
}
