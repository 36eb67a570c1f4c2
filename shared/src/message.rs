use crate::{
    Direction, GateKey, NodeId, ReservationId, Snapshot, Transform, TravelerId, TravelerKind,
};

/// Everything the receiving node needs to rebuild a departing reservation.
/// Encoding to bytes is left to the networking layer, which must carry every
/// field unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct DepartureRequest {
    pub origin: NodeId,
    pub origin_id: ReservationId,
    pub traveler: TravelerId,
    pub traveler_name: String,
    pub rider: Option<TravelerId>,
    pub kind: TravelerKind,
    pub snapshot: Snapshot,
    pub departure: Transform,
    pub departure_direction: Option<Direction>,
    pub departure_gate: Option<GateKey>,
    pub departure_world: Option<String>,
    pub arrival: Option<Transform>,
    pub arrival_direction: Option<Direction>,
    pub arrival_gate: Option<GateKey>,
    pub arrival_world: Option<String>,
}

/// Outcome reported back to the origin of a departure request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrivalReply {
    Approved { id: ReservationId },
    Denied { id: ReservationId, reason: String },
    Arrived { id: ReservationId },
}

impl ArrivalReply {
    pub fn id(&self) -> ReservationId {
        match self {
            ArrivalReply::Approved { id }
            | ArrivalReply::Denied { id, .. }
            | ArrivalReply::Arrived { id } => *id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitMessage {
    Depart(DepartureRequest),
    Reply(ArrivalReply),
}
