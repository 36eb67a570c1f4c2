//! # Transit Shared
//! Common types, collaborator traits and registries shared between the
//! transit reservation server and the hosts that embed it.
//!
//! Every entry point in this workspace assumes it is called from a single
//! logical thread (the host's tick loop). Nothing here synchronizes access
//! to the registries; hosts that cannot guarantee one thread must wrap the
//! reservation context in their own lock or actor.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod destination;
mod error;
mod gate;
mod locks;
mod message;
mod permission;
mod snapshot;
mod transform;
mod types;
mod world;

pub use destination::{apply_safety_scan, resolve_direct, resolve_via_gate, rotate};
pub use error::ReservationError;
pub use gate::{Gate, GateError, GateMap};
pub use locks::{
    countdown_registry::{Countdown, CountdownId, CountdownRegistry},
    lock_registry::LockRegistry,
};
pub use message::{ArrivalReply, DepartureRequest, TransitMessage};
pub use permission::{AllowAll, PermissionDenied, Permissions};
pub use snapshot::{
    snapshot::{RestoreOptions, RiderSnapshot, Snapshot},
    state::{EffectKind, Experience, ItemStack, MovementMode, StatusEffect, Vitals},
};
pub use transform::{Direction, Transform, Vector};
pub use types::{GateKey, NodeId, ReservationId, TravelDirection, TravelerId};
pub use world::{
    obstruction::Obstruction,
    traveler_kind::TravelerKind,
    world_type::{WorldMutType, WorldRefType},
};
