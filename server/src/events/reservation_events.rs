use std::{mem, vec::IntoIter};

use log::warn;

use crate::Reservation;

/// Notifications produced by the reservation state machine, drained by the
/// host with `events.read::<SomeEvent>()`.
pub struct Events {
    departures: Vec<Reservation>,
    arrivals: Vec<Reservation>,
    denials: Vec<(Reservation, String)>,
    timeouts: Vec<Reservation>,
    empty: bool,
}

impl Events {
    pub(crate) fn new() -> Self {
        Self {
            departures: Vec::new(),
            arrivals: Vec::new(),
            denials: Vec::new(),
            timeouts: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: Event>(&mut self) -> V::Iter {
        return V::iter(self);
    }

    pub fn has<V: Event>(&self) -> bool {
        return V::has(self);
    }

    // Crate-public

    pub(crate) fn push_departure(&mut self, reservation: Reservation) {
        self.departures.push(reservation);
        self.empty = false;
    }

    pub(crate) fn push_arrival(&mut self, reservation: Reservation) {
        self.arrivals.push(reservation);
        self.empty = false;
    }

    pub(crate) fn push_denial(&mut self, reservation: Reservation, reason: String) {
        self.denials.push((reservation, reason));
        self.empty = false;
    }

    pub(crate) fn push_timeout(&mut self, reservation: Reservation) {
        self.timeouts.push(reservation);
        self.empty = false;
    }
}

impl Drop for Events {
    fn drop(&mut self) {
        if !self.denials.is_empty() {
            warn!("Dropped Reservation Deny Event(s)! Make sure to handle these through `events.read::<DenyEvent>()`.");
        }
        if !self.timeouts.is_empty() {
            warn!("Dropped Reservation Timeout Event(s)! Make sure to handle these through `events.read::<TimeoutEvent>()`.");
        }
    }
}

// Event Trait
pub trait Event {
    type Iter;

    fn iter(events: &mut Events) -> Self::Iter;

    fn has(events: &Events) -> bool;
}

// DepartEvent
pub struct DepartEvent;
impl Event for DepartEvent {
    type Iter = IntoIter<Reservation>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = mem::take(&mut events.departures);
        return IntoIterator::into_iter(list);
    }

    fn has(events: &Events) -> bool {
        !events.departures.is_empty()
    }
}

// ArriveEvent
pub struct ArriveEvent;
impl Event for ArriveEvent {
    type Iter = IntoIter<Reservation>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = mem::take(&mut events.arrivals);
        return IntoIterator::into_iter(list);
    }

    fn has(events: &Events) -> bool {
        !events.arrivals.is_empty()
    }
}

// DenyEvent
pub struct DenyEvent;
impl Event for DenyEvent {
    type Iter = IntoIter<(Reservation, String)>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = mem::take(&mut events.denials);
        return IntoIterator::into_iter(list);
    }

    fn has(events: &Events) -> bool {
        !events.denials.is_empty()
    }
}

// TimeoutEvent
pub struct TimeoutEvent;
impl Event for TimeoutEvent {
    type Iter = IntoIter<Reservation>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = mem::take(&mut events.timeouts);
        return IntoIterator::into_iter(list);
    }

    fn has(events: &Events) -> bool {
        !events.timeouts.is_empty()
    }
}
