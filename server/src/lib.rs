//! # Transit Server
//! The reservation state machine that moves travelers between gates, within
//! one node or across nodes, together with the store of live reservations
//! and the events it reports to the host.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use transit_shared::{
        AllowAll, ArrivalReply, Countdown, CountdownId, CountdownRegistry, DepartureRequest,
        Direction, Gate, GateError, GateKey, GateMap, LockRegistry, NodeId, PermissionDenied,
        Permissions, ReservationError, ReservationId, Snapshot, Transform, TransitMessage,
        TravelerId, TravelerKind, Vector, WorldMutType, WorldRefType,
    };
}

mod events;
mod reservation;
mod server;

pub use events::{ArriveEvent, DenyEvent, DepartEvent, Event, Events, TimeoutEvent};
pub use reservation::{
    pending_arrivals::PendingArrivals,
    recipe_table::{Recipe, RecipeTable},
    reservation::{DirectDestination, Reservation, ReservationState},
    reservation_store::ReservationStore,
};
pub use server::{ReservationConfig, Reservations};
