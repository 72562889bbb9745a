use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::identity::{Session, User};
use crate::models::{Booking, NewBooking, NewSlot, ParkingSlot};

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for parking slot data access
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// All slots ordered by id
    async fn list_slots(&self) -> RepoResult<Vec<ParkingSlot>>;

    async fn list_available_slots(&self) -> RepoResult<Vec<ParkingSlot>>;

    async fn get_slot(&self, id: i64) -> RepoResult<Option<ParkingSlot>>;

    async fn count_slots(&self) -> RepoResult<i64>;

    /// Insert all slots in one transaction
    async fn insert_slots(&self, slots: &[NewSlot]) -> RepoResult<Vec<ParkingSlot>>;
}

/// Repository trait for booking data access.
///
/// Both mutating calls read the slot rate, price the booking and update the
/// slot in a single transaction.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_booking(&self, id: i64) -> RepoResult<Option<Booking>>;

    /// Insert an `Active` booking and mark its slot occupied since `start_time`,
    /// whatever the slot's previous state. A planned end is priced at the
    /// slot's rate; an unknown slot leaves the cost empty.
    async fn create_booking(&self, booking: &NewBooking) -> RepoResult<Booking>;

    /// Finish an `Active` booking at `end_time`: price the actual stay at the
    /// slot's rate (keeping the previous cost if the slot is gone), mark it
    /// `Completed` and release the slot.
    ///
    /// A booking that is already `Completed` is returned as stored.
    async fn complete_booking(&self, id: i64, end_time: DateTime<Utc>) -> RepoResult<Option<Booking>>;

    /// Most recent first (start time descending)
    async fn list_bookings(&self, limit: i64) -> RepoResult<Vec<Booking>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user, or rename the existing one registered under the same e-mail.
    async fn upsert_user(&self, name: &str, email: &str) -> RepoResult<User>;

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn update_vehicle_type(&self, email: &str, vehicle_type: &str) -> RepoResult<Option<User>>;
}

/// Key to record store for login sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put_session(&self, session: &Session) -> RepoResult<()>;

    async fn get_session(&self, session_id: &str) -> RepoResult<Option<Session>>;

    async fn delete_session(&self, session_id: &str) -> RepoResult<()>;
}
