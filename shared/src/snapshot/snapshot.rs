use log::debug;

use crate::{
    Experience, ItemStack, MovementMode, ReservationError, StatusEffect, TravelerId,
    TravelerKind, Vitals, WorldMutType, WorldRefType,
};

/// Controls which parts of a snapshot are written back on arrival
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Write health, air, food, exhaustion, saturation and fire. Turned off
    /// when the arrival gate owns vitals itself.
    pub vitals: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self { vitals: true }
    }
}

// RiderSnapshot
/// Transient state of a rider, read in one go
#[derive(Clone, Debug, PartialEq)]
pub struct RiderSnapshot {
    pub vitals: Vitals,
    pub movement_mode: MovementMode,
    pub held_slot: usize,
    pub inventory: Vec<Option<ItemStack>>,
    pub armor: Vec<Option<ItemStack>>,
    pub experience: Experience,
    pub effects: Vec<StatusEffect>,
}

impl RiderSnapshot {
    pub fn capture<W: WorldRefType>(
        world: &W,
        rider: &TravelerId,
    ) -> Result<Self, ReservationError> {
        let vitals = world
            .vitals(rider)
            .ok_or(ReservationError::TravelerNotFound { traveler: *rider })?;

        Ok(Self {
            vitals,
            movement_mode: world.movement_mode(rider).unwrap_or_default(),
            held_slot: world.held_slot(rider).unwrap_or(0),
            inventory: world.inventory(rider).unwrap_or_default(),
            armor: world.armor(rider).unwrap_or_default(),
            experience: world.experience(rider).unwrap_or_default(),
            effects: world.effects(rider),
        })
    }

    pub fn restore<W: WorldMutType>(
        &self,
        world: &mut W,
        rider: &TravelerId,
        options: &RestoreOptions,
    ) {
        if options.vitals {
            world.set_vitals(rider, &self.vitals.clamped());
        }

        world.set_movement_mode(rider, self.movement_mode);

        write_slots(world, rider, &self.inventory);
        world.set_held_slot(rider, self.held_slot);
        world.set_armor(rider, &self.armor);

        world.set_experience(rider, &self.experience.clamped());

        // clear first so nothing stale on the destination survives
        for active in world.effects(rider) {
            world.remove_effect(rider, &active.kind);
        }
        for effect in &self.effects {
            world.add_effect(rider, effect);
        }
    }
}

// Snapshot
/// Everything needed to rebuild a traveler at its destination
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub kind: TravelerKind,
    pub rider: Option<RiderSnapshot>,
    /// Inventory owned by the vehicle itself
    pub cargo: Option<Vec<Option<ItemStack>>>,
}

impl Snapshot {
    pub fn capture<W: WorldRefType>(
        world: &W,
        traveler: &TravelerId,
        kind: TravelerKind,
        rider: Option<&TravelerId>,
    ) -> Result<Self, ReservationError> {
        let rider_snapshot = match rider {
            Some(rider) => Some(RiderSnapshot::capture(world, rider)?),
            None => None,
        };

        let cargo = if kind.has_cargo() {
            world.inventory(traveler)
        } else {
            None
        };

        debug!(
            "captured snapshot of {} ({}), rider: {}, cargo slots: {}",
            traveler,
            kind,
            rider_snapshot.is_some(),
            cargo.as_ref().map(|slots| slots.len()).unwrap_or(0)
        );

        Ok(Self {
            kind,
            rider: rider_snapshot,
            cargo,
        })
    }

    pub fn restore<W: WorldMutType>(
        &self,
        world: &mut W,
        traveler: &TravelerId,
        rider: Option<&TravelerId>,
        options: &RestoreOptions,
    ) {
        if let (Some(state), Some(rider)) = (&self.rider, rider) {
            state.restore(world, rider, options);
        }

        if let Some(cargo) = &self.cargo {
            write_slots(world, traveler, cargo);
        }
    }
}

// Empty slots get the explicit empty marker: a freshly created destination
// object may hold default contents of its own.
fn write_slots<W: WorldMutType>(world: &mut W, traveler: &TravelerId, slots: &[Option<ItemStack>]) {
    for (slot, item) in slots.iter().enumerate() {
        let item = item.clone().unwrap_or_else(ItemStack::empty);
        world.set_inventory_slot(traveler, slot, item);
    }
}
