pub mod scorer;

pub use scorer::{ScoredSlot, SlotScorer};

use parkly_core::ParkingSlot;

/// Score with the default weights, as of now
pub fn score(slot: &ParkingSlot) -> i32 {
    SlotScorer::default().score(slot)
}

pub fn predict_free_time(slot: &ParkingSlot) -> i64 {
    SlotScorer::default().predict_free_time(slot)
}

pub fn recommend_best(slots: &[ParkingSlot]) -> Option<&ParkingSlot> {
    SlotScorer::default().recommend_best(slots)
}
