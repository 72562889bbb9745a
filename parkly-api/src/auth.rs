use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Utc};
use parkly_core::identity::User;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    middleware::{session_auth_middleware, SESSION_COOKIE},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub vehicle_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub vehicle_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            vehicle_type: user.vehicle_type,
            created_at: user.created_at,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/auth/me", get(me))
        .route("/v1/auth/me/vehicle", put(update_vehicle))
        .route_layer(middleware::from_fn_with_state(state, session_auth_middleware));

    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .merge(protected)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError("A name and a valid email are required".into()));
    }

    let user = state.identity.register(name, email).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /v1/auth/login
/// Any registered email logs in; a fresh session id is issued as a cookie
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), AppError> {
    let (user, session) = state.identity.login(req.email.trim()).await?
        .ok_or_else(|| AppError::AuthenticationError("Unknown email".into()))?;

    tracing::info!("User {} logged in", user.id);

    let cookie = Cookie::build((SESSION_COOKIE, session.session_id))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), Json(user.into())))
}

/// POST /v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.identity.logout(cookie.value()).await?;
    }

    Ok((jar.remove(Cookie::build(SESSION_COOKIE).path("/")), StatusCode::NO_CONTENT))
}

/// GET /v1/auth/me
async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(user.into())
}

/// PUT /v1/auth/me/vehicle
async fn update_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateVehicleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let vehicle_type = req.vehicle_type.trim();
    if vehicle_type.is_empty() {
        return Err(AppError::ValidationError("vehicle_type must not be empty".into()));
    }

    let updated = state.identity.update_vehicle(&user.email, vehicle_type).await?
        .ok_or_else(|| AppError::NotFoundError("User no longer exists".into()))?;

    Ok(Json(updated.into()))
}
