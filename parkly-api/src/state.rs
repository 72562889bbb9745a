use std::sync::Arc;
use parkly_booking::BookingManager;
use parkly_core::repository::{BookingRepository, SessionStore, SlotRepository, UserRepository};
use parkly_core::Clock;
use parkly_scoring::SlotScorer;
use parkly_store::app_config::{BookingConfig, ScoringConfig, SeedConfig};
use crate::identity::IdentityService;

/// Store handles the application is wired against
pub struct Stores {
    pub slots: Arc<dyn SlotRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub slot_repo: Arc<dyn SlotRepository>,
    pub bookings: Arc<BookingManager>,
    pub scorer: Arc<SlotScorer>,
    pub identity: Arc<IdentityService>,
    pub clock: Arc<dyn Clock>,
    pub seed: SeedConfig,
    pub booking_rules: BookingConfig,
}

impl AppState {
    pub fn new(
        stores: Stores,
        clock: Arc<dyn Clock>,
        scoring: ScoringConfig,
        seed: SeedConfig,
        booking_rules: BookingConfig,
    ) -> Self {
        let bookings = BookingManager::with_clock(stores.bookings, clock.clone());

        Self {
            slot_repo: stores.slots,
            bookings: Arc::new(bookings),
            scorer: Arc::new(SlotScorer::new(scoring)),
            identity: Arc::new(IdentityService::new(stores.users, stores.sessions)),
            clock,
            seed,
            booking_rules,
        }
    }
}
