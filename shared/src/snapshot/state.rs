// ItemStack
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub material: String,
    pub amount: u32,
    pub damage: u16,
}

impl ItemStack {
    pub const EMPTY_MATERIAL: &'static str = "air";

    pub fn new(material: &str, amount: u32) -> Self {
        Self {
            material: material.to_string(),
            amount,
            damage: 0,
        }
    }

    pub fn with_damage(mut self, damage: u16) -> Self {
        self.damage = damage;
        self
    }

    /// Explicit "nothing here" marker written into slots that were empty at
    /// capture time.
    pub fn empty() -> Self {
        Self::new(Self::EMPTY_MATERIAL, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.material == Self::EMPTY_MATERIAL || self.amount == 0
    }
}

// StatusEffect
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EffectKind(String);

impl EffectKind {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub amplifier: u8,
    pub duration_ticks: u32,
}

impl StatusEffect {
    pub fn new(kind: &str, amplifier: u8, duration_ticks: u32) -> Self {
        Self {
            kind: EffectKind::new(kind),
            amplifier,
            duration_ticks,
        }
    }
}

// Vitals
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vitals {
    pub health: f64,
    pub remaining_air: i32,
    pub fire_ticks: i32,
    pub food_level: i32,
    pub exhaustion: f32,
    pub saturation: f32,
}

impl Vitals {
    /// Negative readings from a damaged source are floored at zero. Fire
    /// ticks are left alone: a negative value is a valid fire-immunity
    /// countdown.
    pub fn clamped(&self) -> Vitals {
        Vitals {
            health: self.health.max(0.0),
            remaining_air: self.remaining_air.max(0),
            fire_ticks: self.fire_ticks,
            food_level: self.food_level.max(0),
            exhaustion: self.exhaustion.max(0.0),
            saturation: self.saturation.max(0.0),
        }
    }
}

// Experience
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Experience {
    pub level: i32,
    /// Fractional progress towards the next level, 0.0 to 1.0
    pub progress: f32,
}

impl Experience {
    pub fn new(level: i32, progress: f32) -> Self {
        Self { level, progress }
    }

    pub fn clamped(&self) -> Experience {
        Experience {
            level: self.level.max(0),
            progress: self.progress.max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MovementMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}
