use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;

use transit_server::{ReservationConfig, Reservations};
use transit_shared::{
    GateKey, NodeId, Permissions, ReservationError, ReservationId, TransitMessage, TravelerId,
};

use crate::{TestGates, TestWorld};

// each node hands out traveler ids from its own range
static NEXT_ID_RANGE: AtomicU64 = AtomicU64::new(1);

/// One node: a reservation context with its own world and gates
pub struct TestNode {
    pub id: NodeId,
    pub reservations: Reservations,
    pub world: TestWorld,
    pub gates: TestGates,
}

impl TestNode {
    pub fn new(name: &str) -> Self {
        Self::build(name, Reservations::new(Self::config(name)))
    }

    pub fn with_permissions<P: Permissions + 'static>(name: &str, permissions: P) -> Self {
        Self::build(
            name,
            Reservations::with_permissions(Self::config(name), permissions),
        )
    }

    pub fn config(name: &str) -> ReservationConfig {
        ReservationConfig {
            local_node: NodeId::new(name),
            ..Default::default()
        }
    }

    fn build(name: &str, reservations: Reservations) -> Self {
        Self {
            id: NodeId::new(name),
            reservations,
            world: TestWorld::with_first_id(
                NEXT_ID_RANGE.fetch_add(1, Ordering::Relaxed) * 1_000_000,
            ),
            gates: TestGates::new(),
        }
    }

    /// Reserve through `gate` and depart straight away
    pub fn send_via_gate(
        &mut self,
        traveler: &TravelerId,
        gate: &str,
    ) -> Result<ReservationId, ReservationError> {
        let reservation = self.reservations.reserve_via_gate(
            &self.world,
            &self.gates,
            traveler,
            &GateKey::new(gate),
        )?;
        self.reservations
            .depart(&mut self.world, &mut self.gates, reservation)
    }

    pub fn receive(&mut self, origin: &NodeId, message: TransitMessage) {
        self.reservations
            .receive_message(&mut self.world, &mut self.gates, origin, message);
    }

    pub fn joined(
        &mut self,
        traveler: &TravelerId,
    ) -> Option<Result<ReservationId, ReservationError>> {
        self.reservations
            .traveler_joined(&mut self.world, &mut self.gates, traveler)
    }
}

/// Deliver messages between two nodes until neither has anything left to
/// send. Returns how many messages were delivered.
pub fn exchange_messages(a: &mut TestNode, b: &mut TestNode) -> usize {
    let mut delivered = 0;
    loop {
        let from_a = a.reservations.take_outgoing_messages();
        let from_b = b.reservations.take_outgoing_messages();
        if from_a.is_empty() && from_b.is_empty() {
            return delivered;
        }
        delivered += deliver(a, b, from_a);
        delivered += deliver(b, a, from_b);
    }
}

/// Deliver only what `from` has queued right now, without pumping replies
pub fn deliver_pending(from: &mut TestNode, to: &mut TestNode) -> usize {
    let messages = from.reservations.take_outgoing_messages();
    deliver(from, to, messages)
}

fn deliver(
    from: &TestNode,
    to: &mut TestNode,
    messages: Vec<(NodeId, TransitMessage)>,
) -> usize {
    let mut delivered = 0;
    for (node, message) in messages {
        if node != to.id {
            warn!("dropping message for unknown node '{}'", node);
            continue;
        }
        to.receive(&from.id, message);
        delivered += 1;
    }
    delivered
}
