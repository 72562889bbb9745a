use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use parkly_booking::CreateBookingRequest;
use parkly_core::{Booking, BookingStatus};
use parkly_shared::Masked;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingBody {
    pub slot_id: i64,
    pub user_name: String,
    /// Defaults to now
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub contact_email: Option<Masked<String>>,
    pub vehicle_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
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

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            slot_id: booking.slot_id,
            user_name: booking.user_name,
            contact_email: booking.contact_email,
            vehicle_number: booking.vehicle_number,
            start_time: booking.start_time,
            end_time: booking.end_time,
            total_cost: booking.total_cost,
            status: booking.status,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/history", get(booking_history))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/end", post(end_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let user_name = req.user_name.trim();
    if user_name.is_empty() {
        return Err(AppError::ValidationError("user_name must not be empty".into()));
    }

    let start_time = req.start_time.unwrap_or_else(|| state.clock.now());

    let booking = state.bookings.create_booking(CreateBookingRequest {
        slot_id: req.slot_id,
        user_name: user_name.to_string(),
        start_time,
        end_time: req.end_time,
        contact_email: req.contact_email,
        vehicle_number: req.vehicle_number,
    }).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// POST /v1/bookings/{id}/end
async fn end_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.end_booking(booking_id).await?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking {} not found", booking_id)))?;

    Ok(Json(booking.into()))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.get_booking(booking_id).await?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking {} not found", booking_id)))?;

    Ok(Json(booking.into()))
}

/// GET /v1/bookings/history?limit=
async fn booking_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let limit = params.limit.unwrap_or(state.booking_rules.history_limit);
    if limit < 0 {
        return Err(AppError::ValidationError("limit must not be negative".into()));
    }

    let bookings = state.bookings.booking_history(limit).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
