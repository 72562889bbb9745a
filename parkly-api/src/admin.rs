use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use parkly_booking::{seed_slots, SeedOutcome};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/seed", post(seed))
}

/// POST /v1/admin/seed
/// Fills an empty slot store with the demo catalog; a populated store is left as is
async fn seed(State(state): State<AppState>) -> Result<Json<SeedOutcome>, AppError> {
    let outcome = seed_slots(state.slot_repo.as_ref(), &state.seed).await?;
    Ok(Json(outcome))
}
