//! FIFO waiting pool without duplicates

use std::collections::{HashSet, VecDeque};

use crate::connection_manager::ConnectionId;

/// Ordered set of connections waiting for a partner, oldest first
#[derive(Debug, Default)]
pub struct WaitingPool {
    order: VecDeque<ConnectionId>,
    members: HashSet<ConnectionId>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. Returns false if the id was already waiting.
    pub fn push_back(&mut self, id: ConnectionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Re-insert at the head, keeping the seniority of an id whose
    /// pairing attempt failed through no fault of its own.
    pub fn push_front(&mut self, id: ConnectionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_front(id);
        true
    }

    /// Remove the two oldest entries, or none if fewer than two are waiting
    pub fn pop_pair(&mut self) -> Option<(ConnectionId, ConnectionId)> {
        if self.order.len() < 2 {
            return None;
        }
        let first = self.order.pop_front()?;
        let second = self.order.pop_front()?;
        self.members.remove(&first);
        self.members.remove(&second);
        Some((first, second))
    }

    pub fn remove(&mut self, id: ConnectionId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|queued| *queued != id);
        true
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.order.iter()
    }

    /// Order and membership index agree and hold no duplicates
    pub(crate) fn is_consistent(&self) -> bool {
        self.order.len() == self.members.len()
            && self.order.iter().all(|id| self.members.contains(id))
    }
}
