use thiserror::Error;

use crate::{Direction, GateKey, NodeId, Transform, TravelerId};

/// Errors a gate reports while resolving its link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The gate is not linked to anything
    #[error("Gate '{gate}' has no destination")]
    NoDestination { gate: String },

    /// The gate is linked, but the link cannot be followed right now
    #[error("Gate '{gate}' cannot reach '{destination}': {reason}")]
    Unreachable {
        gate: String,
        destination: String,
        reason: String,
    },
}

/// A configured endpoint. Gates are owned by the topology layer; the
/// reservation core only resolves links through them and reports send and
/// receive events back.
pub trait Gate {
    /// Fully qualified name, unique across nodes.
    fn key(&self) -> &GateKey;

    /// Short, display name.
    fn name(&self) -> &str;

    fn world(&self) -> &str;

    fn direction(&self) -> Direction;

    /// Node hosting this gate, or `None` when the gate lives on this node.
    fn node(&self) -> Option<&NodeId> {
        None
    }

    /// The gate this one currently links to.
    fn destination(&self) -> Result<GateKey, GateError>;

    /// Where a traveler coming in with the given transform and heading should
    /// appear. Velocity of the returned transform is ignored.
    fn spawn_transform(&self, incoming: &Transform, incoming_direction: Direction) -> Transform;

    fn on_send(&mut self, traveler: &TravelerId);

    fn on_receive(&mut self, traveler: &TravelerId);

    /// Record the gate a traveler came from, for bidirectional pairing.
    fn attach(&mut self, origin: Option<&GateKey>);

    /// Announcement template shown to riders on arrival.
    fn arrival_format(&self) -> Option<&str> {
        None
    }
}

/// Lookup of gates by key, implemented by the topology layer.
pub trait GateMap {
    fn gate(&self, key: &GateKey) -> Option<&dyn Gate>;

    fn gate_mut(&mut self, key: &GateKey) -> Option<&mut dyn Gate>;
}
