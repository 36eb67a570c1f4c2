use std::{collections::HashMap, mem, time::Instant};

use log::{debug, info, warn};

use transit_shared::{
    apply_safety_scan, resolve_direct, resolve_via_gate, AllowAll, ArrivalReply, CountdownRegistry,
    DepartureRequest, GateKey, GateMap, LockRegistry, NodeId, Permissions, ReservationError,
    ReservationId, RestoreOptions, Snapshot, Transform, TransitMessage, TravelDirection,
    TravelerId, TravelerKind, Vector, WorldMutType, WorldRefType,
};

use crate::{
    events::Events,
    reservation::{
        pending_arrivals::PendingArrivals,
        recipe_table::{Recipe, RecipeTable},
        reservation::{DirectDestination, Reservation, ReservationState},
        reservation_store::ReservationStore,
    },
    ReservationConfig,
};

/// Owns the lock registry, countdown registry, reservation store and every
/// other piece of state shared by all reservations on this node. Hosts keep
/// one per node and drive it from their tick loop, passing in the world and
/// gate collaborators on each call.
pub struct Reservations {
    config: ReservationConfig,
    permissions: Box<dyn Permissions>,
    recipes: RecipeTable,
    locks: LockRegistry,
    countdowns: CountdownRegistry,
    store: ReservationStore,
    pending_arrivals: PendingArrivals,
    in_transit: HashMap<TravelerId, ReservationId>,
    next_id: ReservationId,
    outgoing_messages: Vec<(NodeId, TransitMessage)>,
    incoming_events: Events,
}

impl Reservations {
    /// Create a context that grants every gate permission
    pub fn new(config: ReservationConfig) -> Self {
        Self::with_permissions(config, AllowAll)
    }

    pub fn with_permissions<P: Permissions + 'static>(
        config: ReservationConfig,
        permissions: P,
    ) -> Self {
        let locks = LockRegistry::new(config.gate_lock_expiration);
        let pending_arrivals = PendingArrivals::new(config.arrival_timeout);

        Self {
            config,
            permissions: Box::new(permissions),
            recipes: RecipeTable::default(),
            locks,
            countdowns: CountdownRegistry::new(),
            store: ReservationStore::new(),
            pending_arrivals,
            in_transit: HashMap::new(),
            next_id: 1,
            outgoing_messages: Vec::new(),
            incoming_events: Events::new(),
        }
    }

    pub fn config(&self) -> &ReservationConfig {
        &self.config
    }

    pub fn recipes(&self) -> &RecipeTable {
        &self.recipes
    }

    pub fn recipes_mut(&mut self) -> &mut RecipeTable {
        &mut self.recipes
    }

    // Construction

    /// Reserve a transfer through `gate` to the gate it links to. The
    /// traveler may be a rider on foot or a vehicle, with or without a rider.
    pub fn reserve_via_gate<W: WorldRefType, G: GateMap>(
        &mut self,
        world: &W,
        gates: &G,
        traveler: &TravelerId,
        gate: &GateKey,
    ) -> Result<Reservation, ReservationError> {
        let Some(departure_gate) = gates.gate(gate) else {
            return Err(ReservationError::UnknownGate {
                gate: gate.to_string(),
            });
        };

        let mut reservation = self.extract_traveler(world, traveler)?;

        let arrival_key =
            departure_gate
                .destination()
                .map_err(|error| ReservationError::Configuration {
                    gate: gate.to_string(),
                    reason: error.to_string(),
                })?;
        let Some(arrival_gate) = gates.gate(&arrival_key) else {
            return Err(ReservationError::Configuration {
                gate: gate.to_string(),
                reason: format!("destination '{}' not found", arrival_key),
            });
        };

        reservation.departure_gate = Some(gate.clone());
        reservation.departure_direction = Some(departure_gate.direction());
        reservation.departure_world = Some(departure_gate.world().to_string());

        reservation.arrival_gate = Some(arrival_key);
        reservation.arrival_direction = Some(arrival_gate.direction());
        reservation.arrival_world = Some(arrival_gate.world().to_string());
        reservation.arrival_node = self.remote_node(arrival_gate.node());

        debug!(
            "reservation {} created for {} to {}",
            reservation.id(),
            reservation.describe_traveler(),
            reservation.describe_destination()
        );

        Ok(reservation)
    }

    /// Reserve a gateless transfer to a location on this node or to a spawn,
    /// world or coordinate on another node.
    pub fn reserve_direct<W: WorldRefType>(
        &mut self,
        world: &W,
        traveler: &TravelerId,
        destination: DirectDestination,
    ) -> Result<Reservation, ReservationError> {
        let mut reservation = self.extract_traveler(world, traveler)?;

        match destination {
            DirectDestination::Location {
                world: target,
                position,
            } => {
                reservation.arrival = Some(Transform {
                    world: target.clone(),
                    position,
                    ..Default::default()
                });
                reservation.arrival_world = target;
            }
            DirectDestination::RemoteSpawn { node } => {
                reservation.arrival_node = self.remote_node(Some(&node));
            }
            DirectDestination::RemoteWorld {
                node,
                world: target,
            } => {
                reservation.arrival_node = self.remote_node(Some(&node));
                reservation.arrival_world = Some(target);
            }
            DirectDestination::RemoteCoordinate {
                node,
                world: target,
                position,
            } => {
                reservation.arrival_node = self.remote_node(Some(&node));
                reservation.arrival = Some(Transform::new(&target, position));
                reservation.arrival_world = Some(target);
            }
        }

        debug!(
            "reservation {} created for {} to {}",
            reservation.id(),
            reservation.describe_traveler(),
            reservation.describe_destination()
        );

        Ok(reservation)
    }

    // Departure

    /// Start the transfer. Same-node transfers arrive before this returns;
    /// cross-node transfers queue a departure request and finish through the
    /// reply callbacks.
    pub fn depart<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        reservation: Reservation,
    ) -> Result<ReservationId, ReservationError> {
        let id = reservation.id();
        let traveler = reservation.traveler;
        let rider = reservation.rider;

        if !self.store.put(reservation) {
            warn!("reservation {} is already in flight", id);
            return Err(ReservationError::DuplicateReservation { id });
        }
        if let Err(error) = self.check_in_flight(&traveler, rider.as_ref(), Some(id)) {
            self.store.remove(&id);
            return Err(error);
        }

        let now = Instant::now();
        self.lock_travelers(&traveler, rider.as_ref(), &now);

        let checked = match self.store.get(&id) {
            Some(reservation) => self.check_gate_permissions(reservation),
            None => Err(ReservationError::ReservationNotFound { id }),
        };
        if let Err(error) = checked {
            if let Some(reservation) = self.store.take(&id) {
                Self::report_failure(world, &reservation, &error);
            }
            return Err(error);
        }

        let Some(reservation) = self.store.get_mut(&id) else {
            return Err(ReservationError::ReservationNotFound { id });
        };
        reservation.state = ReservationState::Departed;
        reservation.departed_at = Some(now);
        let departed = reservation.clone();

        debug!(
            "{} departed for {}",
            departed.describe_traveler(),
            departed.describe_destination()
        );
        self.incoming_events.push_departure(departed.clone());

        let Some(node) = departed.arrival_node.clone() else {
            let Some(reservation) = self.store.take(&id) else {
                return Err(ReservationError::ReservationNotFound { id });
            };
            let arrived = self.arrive(world, gates, reservation)?;
            Self::notify_sent(gates, &arrived);
            return Ok(id);
        };

        self.in_transit.insert(departed.traveler, id);
        if let Some(rider) = departed.rider {
            self.in_transit.insert(rider, id);
        }

        info!(
            "sending {} to {} on node '{}'",
            departed.describe_traveler(),
            departed.describe_destination(),
            node
        );
        let request = departed.to_request(&self.config.local_node);
        self.outgoing_messages
            .push((node, TransitMessage::Depart(request)));

        Ok(id)
    }

    // Arrival

    /// Place the traveler at its destination on this node. The reservation
    /// is no longer stored once this returns, whatever the outcome.
    pub fn arrive<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        mut reservation: Reservation,
    ) -> Result<Reservation, ReservationError> {
        self.store.remove(&reservation.id);

        if let Err(error) = self.materialize(world, gates, &mut reservation) {
            Self::rollback(world, &mut reservation);
            Self::report_failure(world, &reservation, &error);
            return Err(error);
        }

        Self::commit(&reservation);
        Self::notify_received(world, gates, &reservation);

        reservation.state = ReservationState::Arrived;
        info!(
            "{} arrived at {}",
            reservation.describe_traveler(),
            reservation.describe_destination()
        );
        self.incoming_events.push_arrival(reservation.clone());

        Ok(reservation)
    }

    fn materialize<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        reservation: &mut Reservation,
    ) -> Result<(), ReservationError> {
        let Some(recipe) = self.recipes.get(&reservation.kind).copied() else {
            return Err(ReservationError::UnknownTravelerType {
                traveler: reservation.describe_traveler(),
                kind: reservation.kind.to_string(),
            });
        };

        if let Some(key) = &reservation.arrival_gate {
            let Some(gate) = gates.gate_mut(key) else {
                return Err(ReservationError::UnknownGate {
                    gate: key.to_string(),
                });
            };
            gate.attach(reservation.departure_gate.as_ref());
        }

        let destination = Self::resolve_destination(world, &*gates, reservation)?;
        reservation.arrival = Some(destination.clone());

        let spawned = Self::prepare_traveler(world, reservation, &recipe, &destination)?;

        let now = Instant::now();
        self.lock_travelers(&reservation.traveler, reservation.rider.as_ref(), &now);

        if !spawned && !world.teleport(&reservation.traveler, &destination) {
            return Err(ReservationError::Placement {
                traveler: reservation.describe_traveler(),
                destination: reservation.describe_destination(),
            });
        }
        world.set_velocity(&reservation.traveler, &destination.velocity);

        Ok(())
    }

    fn resolve_destination<W: WorldMutType, G: GateMap>(
        world: &mut W,
        gates: &G,
        reservation: &Reservation,
    ) -> Result<Transform, ReservationError> {
        let mut destination = match &reservation.arrival_gate {
            Some(key) => {
                let Some(gate) = gates.gate(key) else {
                    return Err(ReservationError::UnknownGate {
                        gate: key.to_string(),
                    });
                };
                let direction = reservation
                    .departure_direction
                    .unwrap_or_else(|| gate.direction());
                resolve_via_gate(&reservation.departure, direction, gate)
            }
            None => resolve_direct(
                &*world,
                reservation.arrival.as_ref(),
                reservation.arrival_world.as_deref(),
                &reservation.departure,
            )?,
        };

        apply_safety_scan(world, &mut destination);

        Ok(destination)
    }

    /// Make sure the traveler object exists at the destination and carries
    /// its captured state. Returns whether the object was spawned there, in
    /// which case it needs no teleport.
    fn prepare_traveler<W: WorldMutType>(
        world: &mut W,
        reservation: &mut Reservation,
        recipe: &Recipe,
        destination: &Transform,
    ) -> Result<bool, ReservationError> {
        if let Some(rider) = reservation.rider {
            if !world.has_traveler(&rider) {
                return Err(ReservationError::TravelerNotFound { traveler: rider });
            }
        }

        let mut spawned = false;
        if reservation.kind.is_vehicle() {
            // vehicle ids from another node mean nothing here
            let present = reservation.direction == TravelDirection::Departing
                && world.has_traveler(&reservation.traveler);

            if !present {
                Self::spawn_vehicle(world, reservation, recipe, destination)?;
                Self::seat_rider(world, reservation, recipe)?;
                spawned = true;
            } else if reservation.rider.is_some() && recipe.respawn_with_rider {
                let previous = reservation.traveler;
                Self::spawn_vehicle(world, reservation, recipe, destination)?;
                Self::seat_rider(world, reservation, recipe)?;
                world.despawn(&previous);
                debug!(
                    "replaced {} {} with {} at the destination",
                    reservation.kind,
                    previous,
                    reservation.traveler
                );
                spawned = true;
            }
        } else if !world.has_traveler(&reservation.traveler) {
            return Err(ReservationError::TravelerNotFound {
                traveler: reservation.traveler,
            });
        }

        // a linked arrival gate governs vitals itself
        let options = RestoreOptions {
            vitals: reservation.arrival_gate.is_none(),
        };
        reservation.snapshot.restore(
            world,
            &reservation.traveler,
            reservation.rider.as_ref(),
            &options,
        );

        Ok(spawned)
    }

    fn spawn_vehicle<W: WorldMutType>(
        world: &mut W,
        reservation: &mut Reservation,
        recipe: &Recipe,
        destination: &Transform,
    ) -> Result<(), ReservationError> {
        if !recipe.spawnable {
            return Err(ReservationError::UnknownTravelerType {
                traveler: reservation.describe_traveler(),
                kind: reservation.kind.to_string(),
            });
        }

        let Some(vehicle) = world.spawn_vehicle(reservation.kind, destination) else {
            return Err(ReservationError::Placement {
                traveler: reservation.describe_traveler(),
                destination: reservation.describe_destination(),
            });
        };
        debug!("created {} {} at {}", reservation.kind, vehicle, destination);

        reservation.traveler = vehicle;
        reservation.created_traveler = true;
        Ok(())
    }

    fn seat_rider<W: WorldMutType>(
        world: &mut W,
        reservation: &Reservation,
        recipe: &Recipe,
    ) -> Result<(), ReservationError> {
        let Some(rider) = &reservation.rider else {
            return Ok(());
        };
        if !recipe.carries_rider {
            return Ok(());
        }
        if !world.add_passenger(&reservation.traveler, rider) {
            return Err(ReservationError::Placement {
                traveler: reservation.describe_traveler(),
                destination: reservation.describe_destination(),
            });
        }
        Ok(())
    }

    fn rollback<W: WorldMutType>(world: &mut W, reservation: &mut Reservation) {
        reservation.state = ReservationState::RolledBack;
        if !reservation.created_traveler {
            return;
        }
        world.despawn(&reservation.traveler);
        reservation.created_traveler = false;
        debug!(
            "removed {} created for reservation {}",
            reservation.traveler,
            reservation.id()
        );
    }

    fn commit(reservation: &Reservation) {
        debug!("committed reservation {}", reservation.id());
    }

    fn notify_sent<G: GateMap>(gates: &mut G, reservation: &Reservation) {
        let Some(key) = &reservation.departure_gate else {
            return;
        };
        match gates.gate_mut(key) {
            Some(gate) => gate.on_send(&reservation.traveler),
            None => warn!("departure gate '{}' disappeared before send completed", key),
        }
    }

    fn notify_received<W: WorldMutType, G: GateMap>(
        world: &mut W,
        gates: &mut G,
        reservation: &Reservation,
    ) {
        let Some(key) = &reservation.arrival_gate else {
            return;
        };
        let Some(gate) = gates.gate_mut(key) else {
            warn!("arrival gate '{}' disappeared before receive completed", key);
            return;
        };
        gate.on_receive(&reservation.traveler);

        let Some(rider) = &reservation.rider else {
            return;
        };
        let Some(format) = gate.arrival_format() else {
            return;
        };
        let announcement = format_arrival(format, reservation, gate.name(), gate.world());
        if !announcement.is_empty() {
            world.send_feedback(rider, &announcement);
        }
    }

    // Remote outcomes

    /// The remote node accepted the transfer. Departure-side gate bookkeeping
    /// runs here and a vehicle left behind by the rider is removed.
    pub fn approved<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        id: &ReservationId,
    ) -> bool {
        let Some(reservation) = self.store.get_mut(id) else {
            warn!("approval for unknown reservation {}", id);
            return false;
        };
        reservation.state = ReservationState::Approved;
        let reservation = reservation.clone();

        if reservation.rider.is_some() {
            Self::notify_sent(gates, &reservation);
        }

        if reservation.kind.is_vehicle() && world.has_traveler(&reservation.traveler) {
            world.despawn(&reservation.traveler);
            debug!(
                "removed {} {} left behind by reservation {}",
                reservation.kind,
                reservation.traveler,
                reservation.id()
            );
        }

        self.clear_in_transit(&reservation);

        info!(
            "{} was accepted by {}",
            reservation.describe_traveler(),
            reservation.describe_destination()
        );
        self.incoming_events.push_departure(reservation);

        true
    }

    pub fn denied<W: WorldMutType>(
        &mut self,
        world: &mut W,
        id: &ReservationId,
        reason: &str,
    ) -> bool {
        let Some(mut reservation) = self.store.take(id) else {
            warn!("denial for unknown reservation {}: {}", id, reason);
            return false;
        };
        reservation.state = ReservationState::DeniedRemote;
        self.clear_in_transit(&reservation);

        let delivered = match &reservation.rider {
            Some(rider) => world.send_feedback(rider, reason),
            None => false,
        };
        if !delivered {
            warn!(
                "transfer of {} to {} was denied: {}",
                reservation.describe_traveler(),
                reservation.describe_destination(),
                reason
            );
        }

        self.incoming_events
            .push_denial(reservation, reason.to_string());
        true
    }

    pub fn arrived(&mut self, id: &ReservationId) -> bool {
        let Some(mut reservation) = self.store.take(id) else {
            warn!("arrival report for unknown reservation {}", id);
            return false;
        };
        reservation.state = ReservationState::Arrived;
        self.clear_in_transit(&reservation);

        info!(
            "{} arrived at {}",
            reservation.describe_traveler(),
            reservation.describe_destination()
        );
        self.incoming_events.push_arrival(reservation);
        true
    }

    /// No outcome arrived in time. The traveler is put back where it
    /// departed, at rest, and told so.
    pub fn timeout<W: WorldMutType>(&mut self, world: &mut W, id: &ReservationId) -> bool {
        let Some(mut reservation) = self.store.take(id) else {
            warn!("timeout for unknown reservation {}", id);
            return false;
        };
        reservation.state = ReservationState::TimedOut;
        self.clear_in_transit(&reservation);

        warn!(
            "transfer of {} to {} timed out",
            reservation.describe_traveler(),
            reservation.describe_destination()
        );
        Self::return_traveler(world, &reservation);

        self.incoming_events.push_timeout(reservation);
        true
    }

    fn return_traveler<W: WorldMutType>(world: &mut W, reservation: &Reservation) {
        let home = reservation.departure.clone().with_velocity(Vector::ZERO);

        let subject = if world.has_traveler(&reservation.traveler) {
            Some(reservation.traveler)
        } else {
            reservation.rider.filter(|rider| world.has_traveler(rider))
        };
        if let Some(subject) = subject {
            if world.teleport(&subject, &home) {
                world.set_velocity(&subject, &Vector::ZERO);
            } else {
                warn!("could not return {} to {}", subject, home);
            }
        }

        if let Some(rider) = &reservation.rider {
            world.send_feedback(
                rider,
                &format!(
                    "Transfer to {} timed out",
                    reservation.describe_destination()
                ),
            );
        }
    }

    // Messaging

    /// Drain messages for other nodes. The networking layer delivers each
    /// to its node and hands it to that node's `receive_message`.
    pub fn take_outgoing_messages(&mut self) -> Vec<(NodeId, TransitMessage)> {
        mem::take(&mut self.outgoing_messages)
    }

    pub fn receive_message<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        origin: &NodeId,
        message: TransitMessage,
    ) {
        match message {
            TransitMessage::Depart(request) => {
                self.receive_departure(world, gates, origin, request);
            }
            TransitMessage::Reply(reply) => {
                let id = reply.id();
                let known = match reply {
                    ArrivalReply::Approved { id } => self.approved(world, gates, &id),
                    ArrivalReply::Denied { id, reason } => self.denied(world, &id, &reason),
                    ArrivalReply::Arrived { id } => self.arrived(&id),
                };
                if !known {
                    debug!("ignored reply for reservation {} from node '{}'", id, origin);
                }
            }
        }
    }

    fn receive_departure<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        origin: &NodeId,
        request: DepartureRequest,
    ) {
        if request.origin != *origin {
            warn!(
                "departure request from node '{}' names '{}' as its origin",
                origin, request.origin
            );
        }
        let origin_id = request.origin_id;
        let id = self.allocate_id();
        let reservation = Reservation::from_request(id, request);

        debug!(
            "received reservation {} from node '{}' for {} to {}",
            origin_id,
            origin,
            reservation.describe_traveler(),
            reservation.describe_destination()
        );

        if let Err(error) = self.check_arrival(&*world, &*gates, &reservation) {
            warn!(
                "refused {} from node '{}': {}",
                reservation.describe_traveler(),
                origin,
                error
            );
            self.reply(
                origin,
                ArrivalReply::Denied {
                    id: origin_id,
                    reason: error.to_string(),
                },
            );
            return;
        }

        let waiting_for = reservation.rider.filter(|rider| !world.has_traveler(rider));
        if let Some(rider) = waiting_for {
            self.reply(origin, ArrivalReply::Approved { id: origin_id });
            let now = Instant::now();
            if let Some(previous) = self.pending_arrivals.queue(&rider, reservation, &now) {
                warn!(
                    "pending arrival of {} replaced by a newer transfer",
                    previous.describe_traveler()
                );
                if let Some((node, previous_id)) = previous.origin {
                    self.reply(
                        &node,
                        ArrivalReply::Denied {
                            id: previous_id,
                            reason: "Superseded by a newer transfer".to_string(),
                        },
                    );
                }
            }
            return;
        }

        match self.arrive(world, gates, reservation) {
            Ok(_) => {
                self.reply(origin, ArrivalReply::Approved { id: origin_id });
                self.reply(origin, ArrivalReply::Arrived { id: origin_id });
            }
            Err(error) => {
                self.reply(
                    origin,
                    ArrivalReply::Denied {
                        id: origin_id,
                        reason: error.to_string(),
                    },
                );
            }
        }
    }

    /// Complete a pending arrival once its rider shows up on this node.
    /// Returns None if nothing was waiting for the traveler.
    pub fn traveler_joined<W: WorldMutType, G: GateMap>(
        &mut self,
        world: &mut W,
        gates: &mut G,
        traveler: &TravelerId,
    ) -> Option<Result<ReservationId, ReservationError>> {
        let reservation = self.pending_arrivals.take(traveler)?;
        let origin = reservation.origin.clone();

        let result = self
            .arrive(world, gates, reservation)
            .map(|arrived| arrived.id());

        if let Some((node, origin_id)) = origin {
            let reply = match &result {
                Ok(_) => ArrivalReply::Arrived { id: origin_id },
                Err(error) => ArrivalReply::Denied {
                    id: origin_id,
                    reason: error.to_string(),
                },
            };
            self.reply(&node, reply);
        }

        Some(result)
    }

    fn reply(&mut self, node: &NodeId, reply: ArrivalReply) {
        self.outgoing_messages
            .push((node.clone(), TransitMessage::Reply(reply)));
    }

    // Maintenance

    /// Time out cross-node reservations that departed at least
    /// `arrival_timeout` before `now`, and drop pending arrivals whose rider
    /// never joined. Returns how many reservations timed out.
    pub fn check_timeouts<W: WorldMutType>(&mut self, world: &mut W, now: &Instant) -> usize {
        let timeout = self.config.arrival_timeout;
        let mut expired: Vec<ReservationId> = self
            .store
            .iter()
            .filter(|reservation| {
                !reservation.is_local()
                    && reservation
                        .departed_at()
                        .map_or(false, |at| now.saturating_duration_since(*at) >= timeout)
            })
            .map(|reservation| reservation.id())
            .collect();
        expired.sort_unstable();

        for id in &expired {
            self.timeout(world, id);
        }

        for reservation in self.pending_arrivals.expire(now) {
            warn!(
                "{} never joined, dropping arrival",
                reservation.describe_traveler()
            );
            if let Some((node, origin_id)) = &reservation.origin {
                self.reply(
                    node,
                    ArrivalReply::Denied {
                        id: *origin_id,
                        reason: format!(
                            "{} did not arrive in time",
                            reservation.describe_traveler()
                        ),
                    },
                );
            }
        }

        expired.len()
    }

    /// Cancel every countdown owned by a gate that is being removed
    pub fn remove_gate(&mut self, gate: &GateKey) -> usize {
        let cancelled = self.countdowns.cancel_all_for_gate(gate);
        debug!("removed gate '{}', cancelled {} countdown(s)", gate, cancelled);
        cancelled
    }

    pub fn countdowns(&self) -> &CountdownRegistry {
        &self.countdowns
    }

    pub fn countdowns_mut(&mut self) -> &mut CountdownRegistry {
        &mut self.countdowns
    }

    // Queries

    pub fn find_reservation_by_traveler(&self, traveler: &TravelerId) -> Option<&Reservation> {
        self.store.find_by_traveler(traveler)
    }

    pub fn reservation(&self, id: &ReservationId) -> Option<&Reservation> {
        self.store.get(id)
    }

    pub fn reservations_count(&self) -> usize {
        self.store.len()
    }

    pub fn pending_arrivals_count(&self) -> usize {
        self.pending_arrivals.len()
    }

    /// Whether the traveler's re-entry lock is still running. An expired lock
    /// is pruned first.
    pub fn is_locked(&mut self, traveler: &TravelerId) -> bool {
        let now = Instant::now();
        self.locks.prune_if_expired(traveler, &now);
        self.locks.is_locked(traveler, &now)
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Whether the traveler left this node and its transfer has no outcome
    /// yet
    pub fn is_in_transit(&self, traveler: &TravelerId) -> bool {
        self.in_transit.contains_key(traveler)
    }

    pub fn take_events(&mut self) -> Events {
        mem::replace(&mut self.incoming_events, Events::new())
    }

    // Private

    fn allocate_id(&mut self) -> ReservationId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    // A node naming this one is treated as local
    fn remote_node(&self, node: Option<&NodeId>) -> Option<NodeId> {
        node.filter(|node| **node != self.config.local_node).cloned()
    }

    fn extract_traveler<W: WorldRefType>(
        &mut self,
        world: &W,
        traveler: &TravelerId,
    ) -> Result<Reservation, ReservationError> {
        let Some(kind) = world.traveler_kind(traveler) else {
            if world.has_traveler(traveler) {
                return Err(ReservationError::UnknownTravelerType {
                    traveler: traveler.to_string(),
                    kind: "unsupported".to_string(),
                });
            }
            return Err(ReservationError::TravelerNotFound {
                traveler: *traveler,
            });
        };

        let rider = match kind {
            TravelerKind::Rider => Some(*traveler),
            _ => world
                .passengers(traveler)
                .into_iter()
                .find(|passenger| world.traveler_kind(passenger) == Some(TravelerKind::Rider)),
        };

        self.check_in_flight(traveler, rider.as_ref(), None)?;

        let now = Instant::now();
        self.lock_travelers(traveler, rider.as_ref(), &now);

        let snapshot = Snapshot::capture(world, traveler, kind, rider.as_ref())?;
        let departure = world
            .transform(traveler)
            .ok_or(ReservationError::TravelerNotFound {
                traveler: *traveler,
            })?;
        let traveler_name = rider
            .as_ref()
            .and_then(|rider| world.display_name(rider))
            .or_else(|| world.display_name(traveler))
            .unwrap_or_else(|| traveler.to_string());

        let id = self.allocate_id();
        Ok(Reservation::new(
            id,
            *traveler,
            traveler_name,
            rider,
            kind,
            snapshot,
            departure,
        ))
    }

    /// Fails if any stored reservation other than `except` moves the
    /// traveler or its rider.
    fn check_in_flight(
        &self,
        traveler: &TravelerId,
        rider: Option<&TravelerId>,
        except: Option<ReservationId>,
    ) -> Result<(), ReservationError> {
        for candidate in std::iter::once(traveler).chain(rider) {
            let existing = self.store.iter().find(|reservation| {
                Some(reservation.id()) != except
                    && (reservation.traveler() == candidate
                        || reservation.rider() == Some(candidate))
            });
            if let Some(existing) = existing {
                return Err(ReservationError::AlreadyInFlight {
                    traveler: *candidate,
                    existing: existing.id(),
                });
            }
        }
        Ok(())
    }

    fn lock_travelers(&mut self, traveler: &TravelerId, rider: Option<&TravelerId>, now: &Instant) {
        self.locks.lock(traveler, now);
        if let Some(rider) = rider {
            if rider != traveler {
                self.locks.lock(rider, now);
            }
        }
    }

    fn check_gate_permissions(&self, reservation: &Reservation) -> Result<(), ReservationError> {
        let Some(rider) = reservation.rider() else {
            return Ok(());
        };
        for gate in [reservation.departure_gate(), reservation.arrival_gate()]
            .into_iter()
            .flatten()
        {
            self.require_gate_use(rider, reservation.traveler_name(), gate)?;
        }
        Ok(())
    }

    fn check_arrival<W: WorldRefType, G: GateMap>(
        &self,
        world: &W,
        gates: &G,
        reservation: &Reservation,
    ) -> Result<(), ReservationError> {
        if !self.recipes.contains(&reservation.kind) {
            return Err(ReservationError::UnknownTravelerType {
                traveler: reservation.describe_traveler(),
                kind: reservation.kind.to_string(),
            });
        }

        if let Some(key) = reservation.arrival_gate() {
            let Some(gate) = gates.gate(key) else {
                return Err(ReservationError::UnknownGate {
                    gate: key.to_string(),
                });
            };
            if self.remote_node(gate.node()).is_some() {
                return Err(ReservationError::Configuration {
                    gate: key.to_string(),
                    reason: "gate is hosted on another node".to_string(),
                });
            }
            if let Some(rider) = reservation.rider() {
                self.require_gate_use(rider, reservation.traveler_name(), key)?;
            }
        }

        if let Some(world_name) = reservation.arrival_world() {
            if !world.has_world(world_name) {
                return Err(ReservationError::UnknownWorld {
                    world: world_name.to_string(),
                });
            }
        }

        Ok(())
    }

    fn require_gate_use(
        &self,
        rider: &TravelerId,
        traveler_name: &str,
        gate: &GateKey,
    ) -> Result<(), ReservationError> {
        let permission = format!("{}{}", self.config.permission_prefix, gate);
        self.permissions
            .require(rider, &permission)
            .map_err(|denied| ReservationError::Permission {
                traveler: traveler_name.to_string(),
                permission: denied.permission,
                reason: denied.reason,
            })
    }

    fn clear_in_transit(&mut self, reservation: &Reservation) {
        let id = reservation.id();
        self.in_transit.retain(|_, in_flight| *in_flight != id);
    }

    fn report_failure<W: WorldMutType>(
        world: &mut W,
        reservation: &Reservation,
        error: &ReservationError,
    ) {
        if error.is_user_facing() {
            if let Some(rider) = reservation.rider() {
                if world.send_feedback(rider, &error.to_string()) {
                    return;
                }
            }
        }
        warn!(
            "reservation {} of {} to {} failed: {}",
            reservation.id(),
            reservation.describe_traveler(),
            reservation.describe_destination(),
            error
        );
    }
}

fn format_arrival(
    format: &str,
    reservation: &Reservation,
    gate_name: &str,
    gate_world: &str,
) -> String {
    format
        .replace("%player%", reservation.traveler_name())
        .replace("%toGate%", gate_name)
        .replace("%toWorld%", gate_world)
        .replace(
            "%fromGate%",
            reservation.departure_gate().map(GateKey::as_str).unwrap_or(""),
        )
        .replace("%fromWorld%", reservation.departure_world().unwrap_or(""))
}
