use std::time::Instant;

use transit_shared::{
    DepartureRequest, Direction, GateKey, NodeId, ReservationId, Snapshot, Transform,
    TravelDirection, TravelerId, TravelerKind, Vector,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservationState {
    Created,
    Departed,
    /// The remote node accepted the transfer but has not reported arrival
    Approved,
    Arrived,
    DeniedRemote,
    TimedOut,
    RolledBack,
}

/// Where a gateless reservation should land
#[derive(Clone, Debug, PartialEq)]
pub enum DirectDestination {
    /// A position on this node. Without a world the default world is used.
    Location {
        world: Option<String>,
        position: Vector,
    },
    /// Default spawn of the remote node's default world
    RemoteSpawn { node: NodeId },
    /// Spawn of a named world on the remote node
    RemoteWorld { node: NodeId, world: String },
    /// Exact position in a named world on the remote node
    RemoteCoordinate {
        node: NodeId,
        world: String,
        position: Vector,
    },
}

// Reservation
/// One attempt to move a traveler from a departure point to an arrival point.
#[derive(Clone, Debug, PartialEq)]
pub struct Reservation {
    pub(crate) id: ReservationId,
    pub(crate) origin: Option<(NodeId, ReservationId)>,
    pub(crate) direction: TravelDirection,
    pub(crate) state: ReservationState,

    pub(crate) traveler: TravelerId,
    pub(crate) traveler_name: String,
    pub(crate) rider: Option<TravelerId>,
    pub(crate) kind: TravelerKind,
    pub(crate) snapshot: Snapshot,

    pub(crate) departure: Transform,
    pub(crate) departure_direction: Option<Direction>,
    pub(crate) departure_gate: Option<GateKey>,
    pub(crate) departure_world: Option<String>,

    pub(crate) arrival: Option<Transform>,
    pub(crate) arrival_direction: Option<Direction>,
    pub(crate) arrival_gate: Option<GateKey>,
    pub(crate) arrival_world: Option<String>,
    pub(crate) arrival_node: Option<NodeId>,

    pub(crate) created_traveler: bool,
    pub(crate) departed_at: Option<Instant>,
}

impl Reservation {
    pub(crate) fn new(
        id: ReservationId,
        traveler: TravelerId,
        traveler_name: String,
        rider: Option<TravelerId>,
        kind: TravelerKind,
        snapshot: Snapshot,
        departure: Transform,
    ) -> Self {
        let departure_world = departure.world.clone();
        Self {
            id,
            origin: None,
            direction: TravelDirection::Departing,
            state: ReservationState::Created,
            traveler,
            traveler_name,
            rider,
            kind,
            snapshot,
            departure,
            departure_direction: None,
            departure_gate: None,
            departure_world,
            arrival: None,
            arrival_direction: None,
            arrival_gate: None,
            arrival_world: None,
            arrival_node: None,
            created_traveler: false,
            departed_at: None,
        }
    }

    /// Rebuild a reservation received from `request.origin`. The local id is
    /// independent of the origin's id, which is kept for replies.
    pub(crate) fn from_request(id: ReservationId, request: DepartureRequest) -> Self {
        Self {
            id,
            origin: Some((request.origin, request.origin_id)),
            direction: TravelDirection::Arriving,
            state: ReservationState::Departed,
            traveler: request.traveler,
            traveler_name: request.traveler_name,
            rider: request.rider,
            kind: request.kind,
            snapshot: request.snapshot,
            departure: request.departure,
            departure_direction: request.departure_direction,
            departure_gate: request.departure_gate,
            departure_world: request.departure_world,
            arrival: request.arrival,
            arrival_direction: request.arrival_direction,
            arrival_gate: request.arrival_gate,
            arrival_world: request.arrival_world,
            arrival_node: None,
            created_traveler: false,
            departed_at: None,
        }
    }

    pub(crate) fn to_request(&self, origin: &NodeId) -> DepartureRequest {
        DepartureRequest {
            origin: origin.clone(),
            origin_id: self.id,
            traveler: self.traveler,
            traveler_name: self.traveler_name.clone(),
            rider: self.rider,
            kind: self.kind,
            snapshot: self.snapshot.clone(),
            departure: self.departure.clone(),
            departure_direction: self.departure_direction,
            departure_gate: self.departure_gate.clone(),
            departure_world: self.departure_world.clone(),
            arrival: self.arrival.clone(),
            arrival_direction: self.arrival_direction,
            arrival_gate: self.arrival_gate.clone(),
            arrival_world: self.arrival_world.clone(),
        }
    }

    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// Node and reservation id this reservation was received from
    pub fn origin(&self) -> Option<(&NodeId, ReservationId)> {
        self.origin.as_ref().map(|(node, id)| (node, *id))
    }

    pub fn direction(&self) -> TravelDirection {
        self.direction
    }

    pub fn state(&self) -> ReservationState {
        self.state
    }

    pub fn traveler(&self) -> &TravelerId {
        &self.traveler
    }

    pub fn traveler_name(&self) -> &str {
        &self.traveler_name
    }

    pub fn rider(&self) -> Option<&TravelerId> {
        self.rider.as_ref()
    }

    pub fn kind(&self) -> TravelerKind {
        self.kind
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn departure(&self) -> &Transform {
        &self.departure
    }

    pub fn departure_direction(&self) -> Option<Direction> {
        self.departure_direction
    }

    pub fn departure_gate(&self) -> Option<&GateKey> {
        self.departure_gate.as_ref()
    }

    pub fn departure_world(&self) -> Option<&str> {
        self.departure_world.as_deref()
    }

    /// Explicit arrival location before arrival, the resolved destination
    /// after.
    pub fn arrival(&self) -> Option<&Transform> {
        self.arrival.as_ref()
    }

    pub fn arrival_direction(&self) -> Option<Direction> {
        self.arrival_direction
    }

    pub fn arrival_gate(&self) -> Option<&GateKey> {
        self.arrival_gate.as_ref()
    }

    pub fn arrival_world(&self) -> Option<&str> {
        self.arrival_world.as_deref()
    }

    /// None when the destination is on this node
    pub fn arrival_node(&self) -> Option<&NodeId> {
        self.arrival_node.as_ref()
    }

    pub fn is_local(&self) -> bool {
        self.arrival_node.is_none()
    }

    /// Whether the traveler object was created on this node during arrival
    pub fn created_traveler(&self) -> bool {
        self.created_traveler
    }

    pub fn departed_at(&self) -> Option<&Instant> {
        self.departed_at.as_ref()
    }

    pub fn describe_traveler(&self) -> String {
        match (self.kind, &self.rider) {
            (TravelerKind::Rider, _) => format!("player '{}'", self.traveler_name),
            (kind, Some(_)) => format!(
                "player '{}' as a passenger on a {}",
                self.traveler_name,
                kind.label()
            ),
            (kind, None) => format!("{} {}", kind.label(), self.traveler),
        }
    }

    pub fn describe_destination(&self) -> String {
        if let Some(gate) = &self.arrival_gate {
            return format!("'{}'", gate);
        }

        let world = self
            .arrival_world
            .as_deref()
            .or_else(|| self.arrival.as_ref().and_then(|arrival| arrival.world.as_deref()));

        match (world, &self.arrival) {
            (Some(world), Some(arrival)) => {
                let (x, y, z) = arrival.position.block();
                format!("world '{}' @ {},{},{}", world, x, y, z)
            }
            (Some(world), None) => format!("world '{}'", world),
            (None, Some(arrival)) => format!("{}", arrival.position),
            (None, None) => match &self.arrival_node {
                Some(node) => format!("node '{}'", node),
                None => "unknown".to_string(),
            },
        }
    }
}
