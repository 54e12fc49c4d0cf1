use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// The signed-in user, loaded fresh from the user store for this request
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Authentication gate: resolves the bearer token to a stored user or
/// rejects with 401 before any handler runs
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(|msg| {
        tracing::debug!("Rejected unauthenticated request: {}", msg);
        ApiError::unauthorized("Unauthorized")
    })?;

    let claims = validate_jwt(&token, &state.security.jwt_secret).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Unauthorized")
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user {}: {}", claims.sub, e);
            ApiError::internal_server_error("Failed to load user")
        })?
        .ok_or_else(|| {
            tracing::warn!("Token for unknown user {}", claims.sub);
            ApiError::unauthorized("Unauthorized")
        })?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
