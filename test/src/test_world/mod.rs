//! In-memory world for exercising reservations without a host

use std::collections::HashMap;

use transit_shared::{
    EffectKind, Experience, ItemStack, MovementMode, Obstruction, StatusEffect, Transform,
    TravelerId, TravelerKind, Vector, Vitals, WorldMutType, WorldRefType,
};

// TestTraveler
#[derive(Clone, Debug, PartialEq)]
pub struct TestTraveler {
    /// `None` for objects the reservation core does not know how to move
    pub kind: Option<TravelerKind>,
    pub name: Option<String>,
    pub participant: bool,
    pub transform: Transform,
    pub vehicle: Option<TravelerId>,
    pub passengers: Vec<TravelerId>,
    pub vitals: Option<Vitals>,
    pub movement_mode: MovementMode,
    pub held_slot: usize,
    pub inventory: Vec<Option<ItemStack>>,
    pub armor: Vec<Option<ItemStack>>,
    pub experience: Experience,
    pub effects: Vec<StatusEffect>,
}

impl TestTraveler {
    pub fn rider(name: &str, transform: Transform) -> Self {
        Self {
            kind: Some(TravelerKind::Rider),
            name: Some(name.to_string()),
            participant: true,
            transform,
            vehicle: None,
            passengers: Vec::new(),
            vitals: Some(Vitals {
                health: 20.0,
                remaining_air: 300,
                fire_ticks: 0,
                food_level: 20,
                exhaustion: 0.0,
                saturation: 5.0,
            }),
            movement_mode: MovementMode::Survival,
            held_slot: 0,
            inventory: vec![None; 36],
            armor: vec![None; 4],
            experience: Experience::default(),
            effects: Vec::new(),
        }
    }

    pub fn vehicle(kind: TravelerKind, transform: Transform) -> Self {
        let inventory = if kind.has_cargo() {
            vec![None; 27]
        } else {
            Vec::new()
        };
        Self {
            kind: Some(kind),
            name: None,
            participant: false,
            transform,
            vehicle: None,
            passengers: Vec::new(),
            vitals: None,
            movement_mode: MovementMode::Survival,
            held_slot: 0,
            inventory,
            armor: Vec::new(),
            experience: Experience::default(),
            effects: Vec::new(),
        }
    }

    fn is_rider(&self) -> bool {
        self.kind == Some(TravelerKind::Rider)
    }
}

// TestWorld
pub struct TestWorld {
    pub default_world: String,
    pub spawns: HashMap<String, Transform>,
    pub obstructions: HashMap<(String, (i64, i64, i64)), Obstruction>,
    pub travelers: HashMap<TravelerId, TestTraveler>,
    /// Every message shown to a participant, in order
    pub feedback: Vec<(TravelerId, String)>,
    /// Every block `ensure_loaded` was asked for, in order
    pub loaded: Vec<(String, (i64, i64, i64))>,
    pub teleports: Vec<(TravelerId, Transform)>,
    pub despawned: Vec<TravelerId>,
    pub fail_teleport: bool,
    pub fail_spawn: bool,
    pub fail_add_passenger: bool,
    next_id: u64,
}

impl Default for TestWorld {
    fn default() -> Self {
        let mut spawns = HashMap::new();
        spawns.insert(
            "world".to_string(),
            Transform::new("world", Vector::new(0.5, 64.0, 0.5)),
        );
        Self {
            default_world: "world".to_string(),
            spawns,
            obstructions: HashMap::new(),
            travelers: HashMap::new(),
            feedback: Vec::new(),
            loaded: Vec::new(),
            teleports: Vec::new(),
            despawned: Vec::new(),
            fail_teleport: false,
            fail_spawn: false,
            fail_add_passenger: false,
            next_id: 1,
        }
    }
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start handing out ids from `first`, so two nodes never collide
    pub fn with_first_id(first: u64) -> Self {
        Self {
            next_id: first,
            ..Self::default()
        }
    }

    pub fn add_world(&mut self, name: &str, spawn: Vector) {
        self.spawns
            .insert(name.to_string(), Transform::new(name, spawn));
    }

    pub fn set_obstruction(&mut self, world: &str, position: &Vector, obstruction: Obstruction) {
        self.obstructions
            .insert((world.to_string(), position.block()), obstruction);
    }

    pub fn spawn(&mut self, traveler: TestTraveler) -> TravelerId {
        let id = TravelerId::from_u64(self.next_id);
        self.next_id += 1;
        self.travelers.insert(id, traveler);
        id
    }

    /// Insert under a known id, as when a rider joins from another node
    pub fn spawn_with_id(&mut self, id: TravelerId, traveler: TestTraveler) {
        self.travelers.insert(id, traveler);
    }

    pub fn get(&self, id: &TravelerId) -> Option<&TestTraveler> {
        self.travelers.get(id)
    }

    pub fn get_mut(&mut self, id: &TravelerId) -> Option<&mut TestTraveler> {
        self.travelers.get_mut(id)
    }

    pub fn feedback_for(&self, id: &TravelerId) -> Vec<&str> {
        self.feedback
            .iter()
            .filter(|(traveler, _)| traveler == id)
            .map(|(_, message)| message.as_str())
            .collect()
    }

    pub fn vehicles_of_kind(&self, kind: TravelerKind) -> Vec<TravelerId> {
        let mut output: Vec<TravelerId> = self
            .travelers
            .iter()
            .filter(|(_, traveler)| traveler.kind == Some(kind))
            .map(|(id, _)| *id)
            .collect();
        output.sort();
        output
    }

    fn detach(&mut self, rider: &TravelerId) {
        let Some(vehicle) = self.travelers.get_mut(rider).and_then(|r| r.vehicle.take()) else {
            return;
        };
        if let Some(vehicle) = self.travelers.get_mut(&vehicle) {
            vehicle.passengers.retain(|passenger| passenger != rider);
        }
    }
}

impl WorldRefType for TestWorld {
    fn default_world(&self) -> String {
        self.default_world.clone()
    }

    fn has_world(&self, world: &str) -> bool {
        self.spawns.contains_key(world)
    }

    fn world_spawn(&self, world: &str) -> Option<Transform> {
        self.spawns.get(world).cloned()
    }

    fn obstruction_at(&self, world: &str, position: &Vector) -> Obstruction {
        self.obstructions
            .get(&(world.to_string(), position.block()))
            .copied()
            .unwrap_or(Obstruction::Air)
    }

    fn has_traveler(&self, traveler: &TravelerId) -> bool {
        self.travelers.contains_key(traveler)
    }

    fn traveler_kind(&self, traveler: &TravelerId) -> Option<TravelerKind> {
        self.travelers.get(traveler).and_then(|t| t.kind)
    }

    fn passengers(&self, vehicle: &TravelerId) -> Vec<TravelerId> {
        self.travelers
            .get(vehicle)
            .map(|t| t.passengers.clone())
            .unwrap_or_default()
    }

    fn display_name(&self, traveler: &TravelerId) -> Option<String> {
        self.travelers.get(traveler).and_then(|t| t.name.clone())
    }

    fn transform(&self, traveler: &TravelerId) -> Option<Transform> {
        self.travelers.get(traveler).map(|t| t.transform.clone())
    }

    fn vitals(&self, rider: &TravelerId) -> Option<Vitals> {
        self.travelers.get(rider).and_then(|t| t.vitals)
    }

    fn movement_mode(&self, rider: &TravelerId) -> Option<MovementMode> {
        self.travelers
            .get(rider)
            .filter(|t| t.is_rider())
            .map(|t| t.movement_mode)
    }

    fn held_slot(&self, rider: &TravelerId) -> Option<usize> {
        self.travelers
            .get(rider)
            .filter(|t| t.is_rider())
            .map(|t| t.held_slot)
    }

    fn inventory(&self, traveler: &TravelerId) -> Option<Vec<Option<ItemStack>>> {
        let traveler = self.travelers.get(traveler)?;
        let holds_items = match traveler.kind {
            Some(kind) => kind == TravelerKind::Rider || kind.has_cargo(),
            None => false,
        };
        if holds_items {
            Some(traveler.inventory.clone())
        } else {
            None
        }
    }

    fn armor(&self, rider: &TravelerId) -> Option<Vec<Option<ItemStack>>> {
        self.travelers
            .get(rider)
            .filter(|t| t.is_rider())
            .map(|t| t.armor.clone())
    }

    fn experience(&self, rider: &TravelerId) -> Option<Experience> {
        self.travelers
            .get(rider)
            .filter(|t| t.is_rider())
            .map(|t| t.experience)
    }

    fn effects(&self, rider: &TravelerId) -> Vec<StatusEffect> {
        self.travelers
            .get(rider)
            .map(|t| t.effects.clone())
            .unwrap_or_default()
    }
}

impl WorldMutType for TestWorld {
    fn ensure_loaded(&mut self, world: &str, position: &Vector) {
        self.loaded.push((world.to_string(), position.block()));
    }

    fn spawn_vehicle(&mut self, kind: TravelerKind, at: &Transform) -> Option<TravelerId> {
        if self.fail_spawn || !kind.is_vehicle() {
            return None;
        }
        Some(self.spawn(TestTraveler::vehicle(kind, at.clone())))
    }

    fn add_passenger(&mut self, vehicle: &TravelerId, rider: &TravelerId) -> bool {
        if self.fail_add_passenger || !self.travelers.contains_key(rider) {
            return false;
        }
        let Some(transform) = self.travelers.get(vehicle).map(|v| v.transform.clone()) else {
            return false;
        };

        self.detach(rider);

        if let Some(vehicle_state) = self.travelers.get_mut(vehicle) {
            vehicle_state.passengers.push(*rider);
        }
        if let Some(rider_state) = self.travelers.get_mut(rider) {
            rider_state.vehicle = Some(*vehicle);
            rider_state.transform = transform;
        }
        true
    }

    fn despawn(&mut self, traveler: &TravelerId) {
        self.detach(traveler);
        let Some(removed) = self.travelers.remove(traveler) else {
            return;
        };
        for passenger in &removed.passengers {
            if let Some(passenger) = self.travelers.get_mut(passenger) {
                passenger.vehicle = None;
            }
        }
        self.despawned.push(*traveler);
    }

    fn teleport(&mut self, traveler: &TravelerId, to: &Transform) -> bool {
        if self.fail_teleport || !self.travelers.contains_key(traveler) {
            return false;
        }
        self.detach(traveler);

        let Some(state) = self.travelers.get_mut(traveler) else {
            return false;
        };
        state.transform = to.clone();
        let passengers = state.passengers.clone();
        for passenger in passengers {
            if let Some(passenger) = self.travelers.get_mut(&passenger) {
                passenger.transform = to.clone();
            }
        }
        self.teleports.push((*traveler, to.clone()));
        true
    }

    fn set_velocity(&mut self, traveler: &TravelerId, velocity: &Vector) {
        if let Some(state) = self.travelers.get_mut(traveler) {
            state.transform.velocity = *velocity;
        }
    }

    fn set_vitals(&mut self, rider: &TravelerId, vitals: &Vitals) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.vitals = Some(*vitals);
        }
    }

    fn set_movement_mode(&mut self, rider: &TravelerId, mode: MovementMode) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.movement_mode = mode;
        }
    }

    fn set_held_slot(&mut self, rider: &TravelerId, slot: usize) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.held_slot = slot;
        }
    }

    fn set_inventory_slot(&mut self, traveler: &TravelerId, slot: usize, item: ItemStack) {
        let Some(state) = self.travelers.get_mut(traveler) else {
            return;
        };
        if state.inventory.len() <= slot {
            state.inventory.resize(slot + 1, None);
        }
        state.inventory[slot] = if item.is_empty() { None } else { Some(item) };
    }

    fn set_armor(&mut self, rider: &TravelerId, armor: &[Option<ItemStack>]) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.armor = armor.to_vec();
        }
    }

    fn set_experience(&mut self, rider: &TravelerId, experience: &Experience) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.experience = *experience;
        }
    }

    fn remove_effect(&mut self, rider: &TravelerId, kind: &EffectKind) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.effects.retain(|effect| effect.kind != *kind);
        }
    }

    fn add_effect(&mut self, rider: &TravelerId, effect: &StatusEffect) {
        if let Some(state) = self.travelers.get_mut(rider) {
            state.effects.push(effect.clone());
        }
    }

    fn send_feedback(&mut self, traveler: &TravelerId, message: &str) -> bool {
        let participant = self
            .travelers
            .get(traveler)
            .map_or(false, |t| t.participant);
        if !participant {
            return false;
        }
        self.feedback.push((*traveler, message.to_string()));
        true
    }
}
