pub mod pending_arrivals;
pub mod recipe_table;
pub mod reservation;
pub mod reservation_store;
