use std::collections::HashMap;

use log::debug;

use transit_shared::{ReservationId, TravelerId};

use super::reservation::Reservation;

/// Live reservations keyed by id. Holds at most one entry per id.
pub struct ReservationStore {
    reservations: HashMap<ReservationId, Reservation>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: HashMap::new(),
        }
    }

    /// Insert the reservation. Returns false, leaving the stored entry in
    /// place, if the id is already present.
    pub fn put(&mut self, reservation: Reservation) -> bool {
        let id = reservation.id();
        if self.reservations.contains_key(&id) {
            return false;
        }
        self.reservations.insert(id, reservation);
        debug!("put reservation {}", id);
        true
    }

    /// Returns false if the id was not present. Double removal is expected.
    pub fn remove(&mut self, id: &ReservationId) -> bool {
        self.take(id).is_some()
    }

    pub fn take(&mut self, id: &ReservationId) -> Option<Reservation> {
        let reservation = self.reservations.remove(id);
        if reservation.is_some() {
            debug!("removed reservation {}", id);
        }
        reservation
    }

    pub fn get(&self, id: &ReservationId) -> Option<&Reservation> {
        self.reservations.get(id)
    }

    pub fn get_mut(&mut self, id: &ReservationId) -> Option<&mut Reservation> {
        self.reservations.get_mut(id)
    }

    /// Linear scan for a reservation moving `traveler`, either as the
    /// traveler object itself or as its rider.
    pub fn find_by_traveler(&self, traveler: &TravelerId) -> Option<&Reservation> {
        self.reservations
            .values()
            .find(|reservation| {
                reservation.traveler() == traveler || reservation.rider() == Some(traveler)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}
