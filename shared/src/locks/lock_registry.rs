use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::debug;

use crate::TravelerId;

/// Re-entry guard. A locked traveler may not start another transfer until
/// its lock expires.
///
/// Expired entries are only dropped when `prune_if_expired` is called for
/// that traveler; there is no background sweep.
pub struct LockRegistry {
    expiration: Duration,
    locks: HashMap<TravelerId, Instant>,
}

impl LockRegistry {
    pub fn new(expiration: Duration) -> Self {
        Self {
            expiration,
            locks: HashMap::new(),
        }
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Insert or refresh the lock so it expires `expiration` after `now`.
    pub fn lock(&mut self, traveler: &TravelerId, now: &Instant) {
        self.locks.insert(*traveler, *now + self.expiration);
        debug!("added gate lock for traveler {}", traveler);
    }

    pub fn is_locked(&self, traveler: &TravelerId, now: &Instant) -> bool {
        match self.locks.get(traveler) {
            Some(expiry) => *expiry > *now,
            None => false,
        }
    }

    /// Remove the traveler's lock if, and only if, it has expired. Returns
    /// whether an entry was removed.
    pub fn prune_if_expired(&mut self, traveler: &TravelerId, now: &Instant) -> bool {
        let Some(expiry) = self.locks.get(traveler) else {
            return false;
        };
        if *expiry > *now {
            return false;
        }
        self.locks.remove(traveler);
        debug!("removed gate lock for traveler {}", traveler);
        true
    }

    pub fn expiry(&self, traveler: &TravelerId) -> Option<Instant> {
        self.locks.get(traveler).copied()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
