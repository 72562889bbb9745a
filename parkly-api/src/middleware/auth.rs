use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session_id";

/// Resolves the `session_id` cookie to a `User` and puts it in the request
/// extensions for handlers behind this layer.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or_else(|| AppError::AuthenticationError("Login required".into()))?;

    let user = state.identity.session_user(&session_id).await
        .map_err(|e| AppError::InternalServerError(format!("Session lookup failed: {}", e)))?
        .ok_or_else(|| AppError::AuthenticationError("Session expired or unknown".into()))?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
