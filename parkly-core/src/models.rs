use chrono::{DateTime, Utc};
use parkly_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A bookable parking slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParkingSlot {
    pub id: i64,
    pub slot_number: String,
    pub zone: String,
    pub is_occupied: bool,
    pub price_per_hour: f64,
    /// Not cleared when the slot is released.
    pub last_occupied_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Slot definition before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub slot_number: String,
    pub zone: String,
    pub price_per_hour: f64,
}

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(BookingStatus::Active),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(CoreError::InvalidRecord(format!("unknown booking status '{}'", other))),
        }
    }
}

/// A driver's claim on a slot for a period of time.
///
/// References its slot by id; the slot is not owned by the booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub slot_id: i64,
    pub user_name: String,
    pub contact_email: Option<Masked<String>>,
    pub vehicle_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_cost: Option<f64>,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

/// Booking payload handed to the store. The store always persists it as `Active`
/// and prices a planned end from the slot's rate.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub slot_id: i64,
    pub user_name: String,
    pub contact_email: Option<Masked<String>>,
    pub vehicle_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Dashboard occupancy figures
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct OccupancySummary {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
}

impl OccupancySummary {
    pub fn from_slots(slots: &[ParkingSlot]) -> Self {
        let occupied = slots.iter().filter(|s| s.is_occupied).count();
        Self {
            total: slots.len(),
            occupied,
            available: slots.len() - occupied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: i64, occupied: bool) -> ParkingSlot {
        ParkingSlot {
            id,
            slot_number: format!("A{:02}", id),
            zone: "A".to_string(),
            is_occupied: occupied,
            price_per_hour: 80.0,
            last_occupied_time: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!("ACTIVE".parse::<BookingStatus>().unwrap(), BookingStatus::Active);
        assert_eq!(BookingStatus::Completed.to_string(), "COMPLETED");
        assert!("CANCELLED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&BookingStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }

    #[test]
    fn test_occupancy_summary() {
        let slots = vec![slot(1, true), slot(2, false), slot(3, false)];
        let summary = OccupancySummary::from_slots(&slots);
        assert_eq!(summary, OccupancySummary { total: 3, occupied: 1, available: 2 });
        assert_eq!(OccupancySummary::from_slots(&[]), OccupancySummary::default());
    }
}
