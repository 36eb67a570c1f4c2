mod reservation_config;
mod reservations;

pub use reservation_config::ReservationConfig;
pub use reservations::Reservations;
