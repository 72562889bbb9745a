use chrono::{DateTime, Utc};
use parkly_shared::Masked;
use serde::Deserialize;

pub use parkly_core::pricing::booking_cost;

/// Everything needed to open a booking on a slot
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub slot_id: i64,
    pub user_name: String,
    pub start_time: DateTime<Utc>,
    /// Planned end; the actual end is stamped when the booking is ended
    pub end_time: Option<DateTime<Utc>>,
    pub contact_email: Option<Masked<String>>,
    pub vehicle_number: Option<String>,
}
