pub mod obstruction;
pub mod traveler_kind;
pub mod world_type;
