use chrono::{DateTime, Utc};
use parkly_core::ParkingSlot;
use parkly_store::app_config::ScoringConfig;
use serde::Serialize;
use tracing::debug;

/// A slot together with the figures it was ranked by
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredSlot {
    #[serde(flatten)]
    pub slot: ParkingSlot,
    pub score: i32,
    pub predicted_free_minutes: i64,
}

/// Rule-based slot desirability scoring.
///
/// A slot is worth its zone weight, plus a bonus when it is free, or a
/// smaller one when it is occupied but expected to free up soon.
#[derive(Debug, Clone, Default)]
pub struct SlotScorer {
    config: ScoringConfig,
}

impl SlotScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, slot: &ParkingSlot) -> i32 {
        self.score_at(slot, Utc::now())
    }

    pub fn score_at(&self, slot: &ParkingSlot, now: DateTime<Utc>) -> i32 {
        let mut score = self.config.zone_weight(&slot.zone);

        if !slot.is_occupied {
            score += self.config.free_bonus;
        } else if self.predict_free_time_at(slot, now) < self.config.near_free_threshold_minutes {
            score += self.config.near_free_bonus;
        }

        score
    }

    /// Minutes until an occupied slot is expected to be free
    pub fn predict_free_time(&self, slot: &ParkingSlot) -> i64 {
        self.predict_free_time_at(slot, Utc::now())
    }

    /// Linear estimate: every stay is assumed to last `average_duration_minutes`.
    pub fn predict_free_time_at(&self, slot: &ParkingSlot, now: DateTime<Utc>) -> i64 {
        if !slot.is_occupied {
            return 0;
        }
        let Some(since) = slot.last_occupied_time else {
            return 0;
        };

        let elapsed_minutes = (now - since).num_milliseconds() as f64 / 60_000.0;
        let remaining = (self.config.average_duration_minutes as f64 - elapsed_minutes).max(0.0);

        remaining.floor() as i64
    }

    pub fn recommend_best<'a>(&self, slots: &'a [ParkingSlot]) -> Option<&'a ParkingSlot> {
        self.recommend_best_at(slots, Utc::now())
    }

    /// Highest scoring slot; on ties the earliest in `slots` wins
    pub fn recommend_best_at<'a>(
        &self,
        slots: &'a [ParkingSlot],
        now: DateTime<Utc>,
    ) -> Option<&'a ParkingSlot> {
        let mut best: Option<(&'a ParkingSlot, i32)> = None;

        for slot in slots {
            let score = self.score_at(slot, now);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((slot, score)),
            }
        }

        if let Some((slot, score)) = best {
            debug!("Recommended slot {} with score {}", slot.slot_number, score);
        }

        best.map(|(slot, _)| slot)
    }

    pub fn rank(&self, slots: &[ParkingSlot]) -> Vec<ScoredSlot> {
        self.rank_at(slots, Utc::now())
    }

    /// Score every slot and sort best first. Equal scores keep input order.
    pub fn rank_at(&self, slots: &[ParkingSlot], now: DateTime<Utc>) -> Vec<ScoredSlot> {
        let mut ranked: Vec<ScoredSlot> = slots
            .iter()
            .map(|slot| ScoredSlot {
                slot: slot.clone(),
                score: self.score_at(slot, now),
                predicted_free_minutes: self.predict_free_time_at(slot, now),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}
