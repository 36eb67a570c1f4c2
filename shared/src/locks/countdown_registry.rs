use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::debug;

use crate::{GateKey, TravelerId};

pub type CountdownId = u64;

// Countdown
/// Handle to a cancelable pre-departure delay. Clones share the cancelled
/// flag, so the host's scheduler can keep one and poll `is_cancelled`.
#[derive(Clone, Debug)]
pub struct Countdown {
    id: CountdownId,
    traveler: TravelerId,
    gate: GateKey,
    cancelled: Arc<AtomicBool>,
}

impl Countdown {
    fn new(id: CountdownId, traveler: TravelerId, gate: GateKey) -> Self {
        Self {
            id,
            traveler,
            gate,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> CountdownId {
        self.id
    }

    pub fn traveler(&self) -> &TravelerId {
        &self.traveler
    }

    pub fn gate(&self) -> &GateKey {
        &self.gate
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

// CountdownRegistry
/// Active countdowns, at most one per traveler
pub struct CountdownRegistry {
    next_id: CountdownId,
    countdowns: HashMap<TravelerId, Countdown>,
}

impl CountdownRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            countdowns: HashMap::new(),
        }
    }

    /// Register a countdown for the traveler, owned by `gate`. A countdown
    /// already running for the same traveler is cancelled and replaced.
    pub fn start(&mut self, traveler: &TravelerId, gate: &GateKey) -> Countdown {
        let countdown = Countdown::new(self.next_id, *traveler, gate.clone());
        self.next_id += 1;

        if let Some(previous) = self.countdowns.insert(*traveler, countdown.clone()) {
            previous.cancel();
            debug!(
                "replaced countdown {} for traveler {}",
                previous.id(),
                traveler
            );
        }
        debug!("added countdown for traveler {}", traveler);

        countdown
    }

    pub fn exists(&self, traveler: &TravelerId) -> bool {
        self.countdowns.contains_key(traveler)
    }

    pub fn get(&self, traveler: &TravelerId) -> Option<&Countdown> {
        self.countdowns.get(traveler)
    }

    pub fn cancel_by_traveler(&mut self, traveler: &TravelerId) -> bool {
        let Some(countdown) = self.countdowns.remove(traveler) else {
            return false;
        };
        countdown.cancel();
        debug!("removed countdown for traveler {}", traveler);
        true
    }

    /// Cancel by handle identity rather than by traveler key.
    pub fn cancel_by_handle(&mut self, handle: &Countdown) -> bool {
        let before = self.countdowns.len();
        self.countdowns.retain(|traveler, countdown| {
            if countdown.id() != handle.id() {
                return true;
            }
            countdown.cancel();
            debug!("removed countdown for traveler {}", traveler);
            false
        });
        self.countdowns.len() != before
    }

    /// Cancel every countdown owned by the gate. Returns how many were
    /// cancelled.
    pub fn cancel_all_for_gate(&mut self, gate: &GateKey) -> usize {
        let before = self.countdowns.len();
        self.countdowns.retain(|traveler, countdown| {
            if countdown.gate() != gate {
                return true;
            }
            countdown.cancel();
            debug!("removed countdown for traveler {}", traveler);
            false
        });
        before - self.countdowns.len()
    }

    pub fn len(&self) -> usize {
        self.countdowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countdowns.is_empty()
    }
}

impl Default for CountdownRegistry {
    fn default() -> Self {
        Self::new()
    }
}
