use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::MatchmakingConfig;
use crate::connection_manager::{ConnectionId, ConnectionRegistry};
use crate::metrics::MatchmakingMetrics;

use super::state::{MatchState, MatchStats, Outbox, RoomLabel};

/// Owns the waiting pool and partnership table.
///
/// Every operation takes the single state lock for its whole duration, so the
/// pairing pass (pop two, check liveness, commit) is atomic with respect to
/// other requests and to disconnect handling. Notifications are queued to the
/// recipients' writers before the lock is released, which keeps each
/// connection's view of its own transitions in order.
pub struct Matchmaker {
    registry: Arc<ConnectionRegistry>,
    state: Mutex<MatchState>,
    config: MatchmakingConfig,
}

impl Matchmaker {
    pub fn new(registry: Arc<ConnectionRegistry>, config: MatchmakingConfig) -> Self {
        Self {
            registry,
            state: Mutex::new(MatchState::new()),
            config,
        }
    }

    /// Start (or restart) searching for a partner
    pub fn request_match(&self, id: ConnectionId) {
        self.apply(id, true, |state, is_live, out| state.request_match(id, is_live, out));
    }

    /// Leave the current partner and search again; the partner searches too
    pub fn request_next(&self, id: ConnectionId) {
        self.apply(id, true, |state, is_live, out| state.request_next(id, is_live, out));
    }

    /// Leave the current partner and stop searching. The partner is told and
    /// left idle unless `requeue_partner_on_stop` puts it back in the pool.
    pub fn request_stop(&self, id: ConnectionId) {
        let requeue = self.config.requeue_partner_on_stop;
        self.apply(id, true, |state, is_live, out| {
            state.request_stop(id, requeue, is_live, out)
        });
    }

    /// Purge a connection the transport has already unregistered
    pub fn on_disconnect(&self, id: ConnectionId) {
        let requeue = self.config.requeue_partner_on_stop;
        self.apply(id, false, |state, is_live, out| state.remove(id, requeue, is_live, out));
    }

    fn apply<F>(&self, id: ConnectionId, require_registered: bool, transition: F)
    where
        F: FnOnce(&mut MatchState, &dyn Fn(ConnectionId) -> bool, &mut Outbox),
    {
        let mut state = self.state.lock();

        // Checked under the lock so a concurrent disconnect cannot slip in
        // between the check and the transition
        if require_registered && !self.registry.contains(id) {
            tracing::debug!(connection_id = %id, "Ignoring request from unregistered connection");
            return;
        }

        let registry = &self.registry;
        let is_live = |candidate: ConnectionId| registry.contains(candidate);
        let mut outbox = Outbox::default();
        transition(&mut *state, &is_live, &mut outbox);

        self.flush(outbox);
        MatchmakingMetrics::update_state(&state.stats());
    }

    fn flush(&self, outbox: Outbox) {
        MatchmakingMetrics::record_pairs_formed(outbox.pairs_formed as u64);
        MatchmakingMetrics::record_stale_skipped(outbox.stale_skipped as u64);

        for (to, message) in outbox.messages {
            if !self.registry.deliver(to, message) {
                // Recipient vanished mid-flight
                tracing::debug!(connection_id = %to, "Dropped notification for closed connection");
            }
        }
    }

    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.state.lock().partner_of(id)
    }

    pub fn room_of(&self, id: ConnectionId) -> Option<RoomLabel> {
        self.state.lock().room_of(id).cloned()
    }

    pub fn is_waiting(&self, id: ConnectionId) -> bool {
        self.state.lock().is_waiting(id)
    }

    pub fn waiting_ids(&self) -> Vec<ConnectionId> {
        self.state.lock().waiting_ids()
    }

    pub fn stats(&self) -> MatchStats {
        self.state.lock().stats()
    }

    pub fn invariants_hold(&self) -> bool {
        self.state.lock().invariants_hold()
    }
}
