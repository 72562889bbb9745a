pub mod clock;
pub mod identity;
pub mod models;
pub mod pricing;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{Booking, BookingStatus, NewBooking, NewSlot, OccupancySummary, ParkingSlot};
pub use pricing::booking_cost;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Store failure: {0}")]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
