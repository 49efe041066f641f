//! Bounded record of already-reported entry ids.
//!
//! [`SeenIds`] is a FIFO ring: a `VecDeque` keeps insertion order for
//! eviction and a `HashSet` answers membership.  When full, recording a new
//! id evicts the oldest one first, so memory stays bounded no matter how long
//! the process runs or how much the feed churns.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct SeenIds {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl SeenIds {
    /// Create an empty ledger holding at most `capacity` ids (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// `true` if `id` has not been recorded (or has since been evicted).
    pub fn is_new(&self, id: &str) -> bool {
        !self.members.contains(id)
    }

    /// Record `id`.  No-op if already present.
    pub fn record(&mut self, id: &str) {
        if self.members.contains(id) {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.order.push_back(id.to_string());
        self.members.insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
