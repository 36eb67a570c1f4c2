/// What occupies a block, as far as a materializing traveler cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Obstruction {
    Air,
    Water,
    Lava,
    Web,
    Rail,
    Sign,
    Torch,
    Solid,
}

impl Obstruction {
    /// Whether a traveler may keep moving into a block of this kind.
    /// Anything not listed here is treated as solid.
    pub fn is_passable(&self) -> bool {
        match self {
            Obstruction::Air
            | Obstruction::Water
            | Obstruction::Lava
            | Obstruction::Web
            | Obstruction::Rail
            | Obstruction::Sign
            | Obstruction::Torch => true,
            Obstruction::Solid => false,
        }
    }
}
