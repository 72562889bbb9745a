pub mod manager;
pub mod models;
pub mod seed;

pub use manager::BookingManager;
pub use models::{booking_cost, CreateBookingRequest};
pub use seed::{demo_catalog, seed_slots, SeedOutcome};
