// handlers/account/csrf.rs - GET /account/csrf handler

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Json},
};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::csrf::{create_secret, create_token, read_cookie, secret_cookie};
use crate::state::AppState;

/// GET /account/csrf - Issue a CSRF token
///
/// Sets the secret cookie on first use and returns a token to send back in
/// the `x-csrf-token` header of the account form posts.
pub async fn csrf_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let security = &state.security;

    let (secret, set_cookie) = match read_cookie(&headers, &security.csrf_cookie_name) {
        Some(secret) => (secret, None),
        None => {
            let secret = create_secret();
            let cookie = secret_cookie(security, &secret);
            (secret, Some(cookie))
        }
    };

    let token = create_token(&secret).ok_or_else(|| {
        tracing::error!("Failed to sign csrf token");
        ApiError::internal_server_error("Failed to issue csrf token")
    })?;

    let cookies = set_cookie.map(|cookie| (header::SET_COOKIE, cookie));

    Ok((AppendHeaders(cookies), Json(json!({ "csrfToken": token }))))
}
