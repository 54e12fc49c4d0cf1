// handlers/account/password.rs - POST /account/password handler

use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::FormJson;
use crate::middleware::{CurrentUser, EnvelopeResult, StatusEnvelope};
use crate::models::UserPatch;
use crate::state::AppState;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// POST /account/password - Change Password
///
/// Expected Input:
/// ```json
/// { "password": "string" }   // at least 6 characters
/// ```
///
/// Directory-managed (AD/LDAP) users cannot change their password here.
/// The store hashes the new value; a notification goes out once it is saved.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    FormJson(body): FormJson<PasswordRequest>,
) -> EnvelopeResult {
    tracing::debug!("password change by {}", user.email);

    if user.is_ad_user {
        return Err(ApiError::bad_request("The ldap user can not change password.").into());
    }

    if body.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }

    state
        .users
        .update_fields(user.id, UserPatch::password(body.password))
        .await
        .map_err(|e| {
            tracing::error!("Failed to save password of user {}: {}", user.id, e);
            ApiError::internal_server_error("Failed to save user")
        })?;

    if let Err(e) = state.notifier.notify_password_change(&user).await {
        tracing::warn!("Password change notification for {} failed: {}", user.email, e);
    }

    Ok(StatusEnvelope::ok())
}
