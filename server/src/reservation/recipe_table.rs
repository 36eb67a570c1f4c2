use std::collections::HashMap;

use transit_shared::TravelerKind;

/// How a traveler kind is rebuilt at its destination
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    /// The kind can be created from nothing on arrival
    pub spawnable: bool,
    /// A rider is seated on the vehicle after it is created
    pub carries_rider: bool,
    /// An existing vehicle with a rider is despawned and created again at
    /// the destination instead of being moved
    pub respawn_with_rider: bool,
}

impl Recipe {
    pub const RIDER: Recipe = Recipe {
        spawnable: false,
        carries_rider: false,
        respawn_with_rider: false,
    };
    pub const RIDEABLE: Recipe = Recipe {
        spawnable: true,
        carries_rider: true,
        respawn_with_rider: true,
    };
    pub const UNMANNED: Recipe = Recipe {
        spawnable: true,
        carries_rider: false,
        respawn_with_rider: false,
    };
}

/// Materialization recipes by traveler kind. A kind missing from the table
/// cannot be moved.
#[derive(Clone)]
pub struct RecipeTable {
    recipes: HashMap<TravelerKind, Recipe>,
}

impl RecipeTable {
    pub fn empty() -> Self {
        Self {
            recipes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: TravelerKind, recipe: Recipe) -> Option<Recipe> {
        self.recipes.insert(kind, recipe)
    }

    pub fn remove(&mut self, kind: &TravelerKind) -> Option<Recipe> {
        self.recipes.remove(kind)
    }

    pub fn get(&self, kind: &TravelerKind) -> Option<&Recipe> {
        self.recipes.get(kind)
    }

    pub fn contains(&self, kind: &TravelerKind) -> bool {
        self.recipes.contains_key(kind)
    }
}

impl Default for RecipeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for kind in TravelerKind::ALL {
            let recipe = match kind {
                TravelerKind::Rider => Recipe::RIDER,
                TravelerKind::Cart | TravelerKind::Boat => Recipe::RIDEABLE,
                TravelerKind::StorageCart
                | TravelerKind::PoweredCart
                | TravelerKind::HopperCart
                | TravelerKind::SpawnerCart
                | TravelerKind::ExplosiveCart => Recipe::UNMANNED,
            };
            table.insert(kind, recipe);
        }
        table
    }
}
