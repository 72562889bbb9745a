use crate::models::CreateBookingRequest;
use parkly_core::repository::BookingRepository;
use parkly_core::{Booking, Clock, CoreResult, NewBooking, SystemClock};
use std::sync::Arc;
use tracing::info;

/// Manages the booking lifecycle: Active → Completed.
///
/// Every transition is one store call, which prices the booking and updates
/// the occupancy of its slot in the same transaction. Nothing guards against
/// two active bookings on the same slot; the later one simply overwrites the
/// occupancy.
pub struct BookingManager {
    bookings: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingManager {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self::with_clock(bookings, Arc::new(SystemClock))
    }

    pub fn with_clock(bookings: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    /// Open a booking and mark its slot occupied from `start_time`.
    ///
    /// A planned end time prices the booking up front. The slot is not
    /// required to exist or to be free.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> CoreResult<Booking> {
        let booking = self
            .bookings
            .create_booking(&NewBooking {
                slot_id: request.slot_id,
                user_name: request.user_name,
                contact_email: request.contact_email,
                vehicle_number: request.vehicle_number,
                start_time: request.start_time,
                end_time: request.end_time,
            })
            .await?;

        info!("Booking {} created on slot {}", booking.id, booking.slot_id);
        Ok(booking)
    }

    /// Close a booking now: stamp the end time, price the actual stay and
    /// release the slot. `None` when the booking does not exist; a completed
    /// booking comes back unchanged.
    pub async fn end_booking(&self, booking_id: i64) -> CoreResult<Option<Booking>> {
        let completed = self.bookings.complete_booking(booking_id, self.clock.now()).await?;

        if let Some(ref b) = completed {
            info!("Booking {} is {}, total cost {:?}", b.id, b.status, b.total_cost);
        }
        Ok(completed)
    }

    pub async fn get_booking(&self, booking_id: i64) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.get_booking(booking_id).await?)
    }

    /// Most recent bookings first
    pub async fn booking_history(&self, limit: i64) -> CoreResult<Vec<Booking>> {
        Ok(self.bookings.list_bookings(limit).await?)
    }
}
