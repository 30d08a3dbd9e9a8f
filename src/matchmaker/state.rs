//! Waiting pool and partnership table, mutated one event at a time.
//!
//! `MatchState` knows nothing about sockets or locks. Liveness is asked of the
//! caller through an `is_live` predicate, and every notification a transition
//! produces is pushed into an [`Outbox`] for the caller to deliver.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::connection_manager::ConnectionId;
use crate::websocket::ServerMessage;

use super::pool::WaitingPool;

/// Grouping token for a formed pair. Informational only; relay is by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomLabel(String);

impl RoomLabel {
    pub fn for_pair(first: ConnectionId, second: ConnectionId) -> Self {
        Self(format!("room_{}_{}", first, second))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct Partner {
    id: ConnectionId,
    room: RoomLabel,
}

/// Notifications and counters produced by one transition
#[derive(Debug, Default)]
pub struct Outbox {
    pub messages: Vec<(ConnectionId, ServerMessage)>,
    pub pairs_formed: usize,
    /// Pairing attempts abandoned because one side was no longer registered
    pub stale_skipped: usize,
}

impl Outbox {
    fn notify(&mut self, to: ConnectionId, message: ServerMessage) {
        self.messages.push((to, message));
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MatchStats {
    pub waiting: usize,
    pub active_pairs: usize,
    pub total_pairs_formed: u64,
}

#[derive(Debug, Default)]
pub struct MatchState {
    pool: WaitingPool,
    partners: HashMap<ConnectionId, Partner>,
    total_pairs_formed: u64,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partnership of `id` (partner is told, not re-queued),
    /// queue `id` if it isn't already, and run a pairing pass.
    pub fn request_match<L>(&mut self, id: ConnectionId, is_live: &L, out: &mut Outbox)
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        self.release(id, is_live, out);
        self.enqueue_and_pair(&[id], is_live, out);
        self.debug_check();
    }

    /// Drop the partnership of `id` and send both sides back to the pool,
    /// the former partner ahead of `id`.
    pub fn request_next<L>(&mut self, id: ConnectionId, is_live: &L, out: &mut Outbox)
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        match self.release(id, is_live, out) {
            Some(partner) => self.enqueue_and_pair(&[partner, id], is_live, out),
            None => self.enqueue_and_pair(&[id], is_live, out),
        }
        self.debug_check();
    }

    /// Take `id` out of matching entirely. Its partner is told and, when
    /// `requeue_partner` is set, returned to the pool.
    pub fn request_stop<L>(
        &mut self,
        id: ConnectionId,
        requeue_partner: bool,
        is_live: &L,
        out: &mut Outbox,
    ) where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        let partner = self.release(id, is_live, out);
        self.pool.remove(id);

        if let Some(partner) = partner.filter(|_| requeue_partner) {
            self.enqueue_and_pair(&[partner], is_live, out);
        }
        self.debug_check();
    }

    /// Purge every trace of `id`
    pub fn remove<L>(&mut self, id: ConnectionId, requeue_partner: bool, is_live: &L, out: &mut Outbox)
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        self.request_stop(id, requeue_partner, is_live, out);
        debug_assert!(!self.pool.contains(id) && !self.partners.contains_key(&id));
    }

    /// Break the partnership of `id` on both sides. Returns the former
    /// partner if it is still live (and was notified).
    fn release<L>(&mut self, id: ConnectionId, is_live: &L, out: &mut Outbox) -> Option<ConnectionId>
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        let partner = self.partners.remove(&id)?;
        self.partners.remove(&partner.id);

        tracing::info!(
            connection_id = %id,
            partner_id = %partner.id,
            room = %partner.room,
            "Partnership released"
        );

        if !is_live(partner.id) {
            return None;
        }
        out.notify(partner.id, ServerMessage::PartnerDisconnected);
        Some(partner.id)
    }

    /// Append `ids` in order, run the pairing pass, then tell every id that
    /// was newly queued and is still unpaired that it is waiting.
    fn enqueue_and_pair<L>(&mut self, ids: &[ConnectionId], is_live: &L, out: &mut Outbox)
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        let queued: Vec<ConnectionId> = ids
            .iter()
            .copied()
            .filter(|id| self.pool.push_back(*id))
            .collect();

        self.run_pairing(is_live, out);

        for id in queued {
            if self.pool.contains(id) {
                tracing::debug!(connection_id = %id, waiting = self.pool.len(), "Waiting for partner");
                out.notify(id, ServerMessage::WaitingForPartner);
            }
        }
    }

    /// Drain the pool two at a time, oldest first
    fn run_pairing<L>(&mut self, is_live: &L, out: &mut Outbox)
    where
        L: Fn(ConnectionId) -> bool + ?Sized,
    {
        while let Some((first, second)) = self.pool.pop_pair() {
            match (is_live(first), is_live(second)) {
                (true, true) => self.commit_pair(first, second, out),
                (first_live, second_live) => {
                    out.stale_skipped += 1;
                    // Survivors keep their place at the head, in their original order
                    if second_live {
                        self.pool.push_front(second);
                    }
                    if first_live {
                        self.pool.push_front(first);
                    }
                    tracing::debug!(
                        first = %first,
                        second = %second,
                        first_live,
                        second_live,
                        "Skipped pairing with a vanished connection"
                    );
                }
            }
        }
    }

    fn commit_pair(&mut self, first: ConnectionId, second: ConnectionId, out: &mut Outbox) {
        let room = RoomLabel::for_pair(first, second);

        self.partners.insert(
            first,
            Partner {
                id: second,
                room: room.clone(),
            },
        );
        self.partners.insert(
            second,
            Partner {
                id: first,
                room: room.clone(),
            },
        );
        self.total_pairs_formed += 1;
        out.pairs_formed += 1;

        out.notify(first, ServerMessage::partner_found(second));
        out.notify(second, ServerMessage::partner_found(first));

        tracing::info!(first = %first, second = %second, room = %room, "Matched partners");
    }

    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.partners.get(&id).map(|p| p.id)
    }

    pub fn room_of(&self, id: ConnectionId) -> Option<&RoomLabel> {
        self.partners.get(&id).map(|p| &p.room)
    }

    pub fn is_waiting(&self, id: ConnectionId) -> bool {
        self.pool.contains(id)
    }

    /// Waiting ids, oldest first
    pub fn waiting_ids(&self) -> Vec<ConnectionId> {
        self.pool.iter().copied().collect()
    }

    pub fn stats(&self) -> MatchStats {
        MatchStats {
            waiting: self.pool.len(),
            active_pairs: self.partners.len() / 2,
            total_pairs_formed: self.total_pairs_formed,
        }
    }

    /// Pool and partnership table are disjoint, partnerships are symmetric
    /// and the pool holds no duplicates.
    pub fn invariants_hold(&self) -> bool {
        self.pool.is_consistent()
            && self.partners.iter().all(|(id, partner)| {
                !self.pool.contains(*id)
                    && partner.id != *id
                    && self.partners.get(&partner.id).map(|back| back.id) == Some(*id)
            })
    }

    fn debug_check(&self) {
        debug_assert!(self.invariants_hold(), "matchmaking invariants violated: {:?}", self);
    }
}
