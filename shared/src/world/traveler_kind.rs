use std::fmt;

/// Closed set of traveler types the reservation core knows how to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TravelerKind {
    /// A live participant travelling on foot
    Rider,
    Cart,
    StorageCart,
    PoweredCart,
    HopperCart,
    SpawnerCart,
    ExplosiveCart,
    Boat,
}

impl TravelerKind {
    pub const ALL: [TravelerKind; 8] = [
        TravelerKind::Rider,
        TravelerKind::Cart,
        TravelerKind::StorageCart,
        TravelerKind::PoweredCart,
        TravelerKind::HopperCart,
        TravelerKind::SpawnerCart,
        TravelerKind::ExplosiveCart,
        TravelerKind::Boat,
    ];

    pub fn is_vehicle(&self) -> bool {
        *self != TravelerKind::Rider
    }

    /// Vehicles that own an inventory of their own.
    pub fn has_cargo(&self) -> bool {
        matches!(self, TravelerKind::StorageCart | TravelerKind::HopperCart)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TravelerKind::Rider => "rider",
            TravelerKind::Cart => "minecart",
            TravelerKind::StorageCart => "storage minecart",
            TravelerKind::PoweredCart => "powered minecart",
            TravelerKind::HopperCart => "hopper minecart",
            TravelerKind::SpawnerCart => "spawner minecart",
            TravelerKind::ExplosiveCart => "explosive minecart",
            TravelerKind::Boat => "boat",
        }
    }
}

impl fmt::Display for TravelerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
