use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use parkly_core::{CoreError, OccupancySummary, ParkingSlot};
use parkly_scoring::ScoredSlot;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotResponse {
    pub id: i64,
    pub slot_number: String,
    pub zone: String,
    pub is_occupied: bool,
    pub price_per_hour: f64,
    pub last_occupied_time: Option<DateTime<Utc>>,
    pub score: i32,
    pub predicted_free_minutes: i64,
}

impl From<ScoredSlot> for SlotResponse {
    fn from(scored: ScoredSlot) -> Self {
        let ScoredSlot { slot, score, predicted_free_minutes } = scored;
        Self {
            id: slot.id,
            slot_number: slot.slot_number,
            zone: slot.zone,
            is_occupied: slot.is_occupied,
            price_per_hour: slot.price_per_hour,
            last_occupied_time: slot.last_occupied_time,
            score,
            predicted_free_minutes,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/dashboard", get(dashboard))
        .route("/v1/slots", get(list_slots))
        .route("/v1/slots/available", get(available_slots))
        .route("/v1/slots/recommended", get(recommended_slot))
        .route("/v1/slots/{id}", get(get_slot))
}

/// Scores a slot against the shared clock
fn scored(state: &AppState, slot: ParkingSlot) -> SlotResponse {
    let now = state.clock.now();
    ScoredSlot {
        score: state.scorer.score_at(&slot, now),
        predicted_free_minutes: state.scorer.predict_free_time_at(&slot, now),
        slot,
    }
    .into()
}

/// GET /v1/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<OccupancySummary>, AppError> {
    let slots = state.slot_repo.list_slots().await.map_err(CoreError::from)?;
    Ok(Json(OccupancySummary::from_slots(&slots)))
}

/// GET /v1/slots
/// Every slot, best score first
async fn list_slots(State(state): State<AppState>) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let slots = state.slot_repo.list_slots().await.map_err(CoreError::from)?;
    let ranked = state.scorer.rank_at(&slots, state.clock.now());

    Ok(Json(ranked.into_iter().map(SlotResponse::from).collect()))
}

/// GET /v1/slots/available
async fn available_slots(State(state): State<AppState>) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let slots = state.slot_repo.list_available_slots().await.map_err(CoreError::from)?;

    Ok(Json(slots.into_iter().map(|s| scored(&state, s)).collect()))
}

/// GET /v1/slots/recommended
async fn recommended_slot(State(state): State<AppState>) -> Result<Json<SlotResponse>, AppError> {
    let slots = state.slot_repo.list_slots().await.map_err(CoreError::from)?;
    let best = state.scorer.recommend_best_at(&slots, state.clock.now())
        .cloned()
        .ok_or_else(|| AppError::NotFoundError("No parking slots available".into()))?;

    Ok(Json(scored(&state, best)))
}

/// GET /v1/slots/{id}
async fn get_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
) -> Result<Json<SlotResponse>, AppError> {
    let slot = state.slot_repo.get_slot(slot_id).await.map_err(CoreError::from)?
        .ok_or_else(|| AppError::NotFoundError(format!("Slot {} not found", slot_id)))?;

    Ok(Json(scored(&state, slot)))
}
