use thiserror::Error;

use crate::{ReservationId, TravelerId};

/// Local, synchronous failures of a reservation.
///
/// Remote denials and timeouts are protocol outcomes and are delivered as
/// callbacks and events, never through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// The departure gate has no resolvable destination
    #[error("Gate '{gate}' has no usable destination: {reason}")]
    Configuration { gate: String, reason: String },

    /// A gate referenced by the reservation is not known to this node
    #[error("Gate '{gate}' not found")]
    UnknownGate { gate: String },

    /// The capability check refused the departure or arrival
    #[error("{traveler} may not use '{permission}': {reason}")]
    Permission {
        traveler: String,
        permission: String,
        reason: String,
    },

    /// The world refused to place the traveler at its destination
    #[error("Teleport of {traveler} to {destination} failed")]
    Placement {
        traveler: String,
        destination: String,
    },

    /// The traveler's type has no materialization recipe
    #[error("Unknown traveler type for {traveler}: {kind}")]
    UnknownTravelerType { traveler: String, kind: String },

    /// The traveler object is not present in the world
    #[error("Traveler {traveler} not found")]
    TravelerNotFound { traveler: TravelerId },

    /// A live reservation already exists for the traveler
    #[error("Traveler {traveler} already has reservation {existing} in flight")]
    AlreadyInFlight {
        traveler: TravelerId,
        existing: ReservationId,
    },

    /// A reservation with the same id is already stored
    #[error("Reservation {id} is already stored")]
    DuplicateReservation { id: ReservationId },

    /// No live reservation with the given id
    #[error("Reservation {id} not found")]
    ReservationNotFound { id: ReservationId },

    /// The destination world does not exist on this node
    #[error("World '{world}' not found")]
    UnknownWorld { world: String },
}

impl ReservationError {
    /// Whether the failure should be shown to the traveler rather than only
    /// logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ReservationError::Permission { .. } | ReservationError::Configuration { .. }
        )
    }
}
