pub mod countdown_registry;
pub mod lock_registry;
