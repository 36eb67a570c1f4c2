use crate::{
    EffectKind, Experience, ItemStack, MovementMode, Obstruction, StatusEffect, Transform,
    TravelerId, TravelerKind, Vector, Vitals,
};

/// Read access to the host's world: spatial queries plus the transient state
/// of traveler objects. Travelers are opaque handles; the core never assumes
/// anything about how the host stores them.
pub trait WorldRefType {
    // Worlds

    fn default_world(&self) -> String;

    fn has_world(&self, world: &str) -> bool;

    /// Default spawn of the named world, `None` if the world is unknown.
    fn world_spawn(&self, world: &str) -> Option<Transform>;

    fn obstruction_at(&self, world: &str, position: &Vector) -> Obstruction;

    // Travelers

    fn has_traveler(&self, traveler: &TravelerId) -> bool;

    /// `None` when the object is not something the core knows how to move.
    fn traveler_kind(&self, traveler: &TravelerId) -> Option<TravelerKind>;

    fn passengers(&self, vehicle: &TravelerId) -> Vec<TravelerId>;

    fn display_name(&self, traveler: &TravelerId) -> Option<String>;

    fn transform(&self, traveler: &TravelerId) -> Option<Transform>;

    // Rider state

    fn vitals(&self, rider: &TravelerId) -> Option<Vitals>;

    fn movement_mode(&self, rider: &TravelerId) -> Option<MovementMode>;

    fn held_slot(&self, rider: &TravelerId) -> Option<usize>;

    /// Rider inventory, or the cargo of a container vehicle. Empty slots are
    /// `None`.
    fn inventory(&self, traveler: &TravelerId) -> Option<Vec<Option<ItemStack>>>;

    fn armor(&self, rider: &TravelerId) -> Option<Vec<Option<ItemStack>>>;

    fn experience(&self, rider: &TravelerId) -> Option<Experience>;

    fn effects(&self, rider: &TravelerId) -> Vec<StatusEffect>;
}

/// Write access to the host's world
pub trait WorldMutType: WorldRefType {
    fn ensure_loaded(&mut self, world: &str, position: &Vector);

    /// Create a fresh vehicle of the given kind. `None` if the world refuses.
    fn spawn_vehicle(&mut self, kind: TravelerKind, at: &Transform) -> Option<TravelerId>;

    fn add_passenger(&mut self, vehicle: &TravelerId, rider: &TravelerId) -> bool;

    fn despawn(&mut self, traveler: &TravelerId);

    /// Move the traveler. Returns false when the world rejects the placement.
    fn teleport(&mut self, traveler: &TravelerId, to: &Transform) -> bool;

    fn set_velocity(&mut self, traveler: &TravelerId, velocity: &Vector);

    fn set_vitals(&mut self, rider: &TravelerId, vitals: &Vitals);

    fn set_movement_mode(&mut self, rider: &TravelerId, mode: MovementMode);

    fn set_held_slot(&mut self, rider: &TravelerId, slot: usize);

    fn set_inventory_slot(&mut self, traveler: &TravelerId, slot: usize, item: ItemStack);

    fn set_armor(&mut self, rider: &TravelerId, armor: &[Option<ItemStack>]);

    fn set_experience(&mut self, rider: &TravelerId, experience: &Experience);

    fn remove_effect(&mut self, rider: &TravelerId, kind: &EffectKind);

    fn add_effect(&mut self, rider: &TravelerId, effect: &StatusEffect);

    /// Show a message to the traveler. Returns false when the traveler has no
    /// direct feedback channel.
    fn send_feedback(&mut self, traveler: &TravelerId, message: &str) -> bool;
}
