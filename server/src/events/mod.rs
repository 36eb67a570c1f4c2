pub(crate) mod reservation_events;

pub use reservation_events::*;
