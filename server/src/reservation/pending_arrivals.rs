use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::debug;

use transit_shared::TravelerId;

use super::reservation::Reservation;

/// Arrivals accepted from another node whose rider has not joined this node
/// yet, keyed by rider identity. Entries are dropped after `ttl`.
pub struct PendingArrivals {
    ttl: Duration,
    arrivals: HashMap<TravelerId, (Instant, Reservation)>,
}

impl PendingArrivals {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            arrivals: HashMap::new(),
        }
    }

    /// Park the reservation until `rider` joins. Replaces an older entry for
    /// the same rider, which is returned.
    pub fn queue(
        &mut self,
        rider: &TravelerId,
        reservation: Reservation,
        now: &Instant,
    ) -> Option<Reservation> {
        debug!(
            "queued arrival of {} until {} joins",
            reservation.describe_traveler(),
            rider
        );
        self.arrivals
            .insert(*rider, (*now, reservation))
            .map(|(_, previous)| previous)
    }

    pub fn take(&mut self, rider: &TravelerId) -> Option<Reservation> {
        self.arrivals.remove(rider).map(|(_, reservation)| reservation)
    }

    /// Remove and return every entry queued at least `ttl` before `now`.
    pub fn expire(&mut self, now: &Instant) -> Vec<Reservation> {
        let expired: Vec<TravelerId> = self
            .arrivals
            .iter()
            .filter(|(_, (queued_at, _))| now.saturating_duration_since(*queued_at) >= self.ttl)
            .map(|(rider, _)| *rider)
            .collect();

        let mut output = Vec::new();
        for rider in expired {
            if let Some((_, reservation)) = self.arrivals.remove(&rider) {
                output.push(reservation);
            }
        }
        output
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}
