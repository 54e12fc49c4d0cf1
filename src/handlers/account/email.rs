// handlers/account/email.rs - POST /account/email handler

use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::FormJson;
use crate::middleware::{CurrentUser, EnvelopeResult, StatusEnvelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Well-formed `local@domain` address check
pub fn is_valid_email(email: &str) -> bool {
    email.parse::<lettre::Address>().is_ok()
}

/// POST /account/email - Change Email
///
/// Expected Input:
/// ```json
/// { "email": "string" }   // must be a valid address
/// ```
///
/// Any failure to save is reported as "email already in use"; the unique
/// index is by far the most common cause.
pub async fn change_email(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    FormJson(body): FormJson<EmailRequest>,
) -> EnvelopeResult {
    let new_email = match body.email {
        Some(email) if is_valid_email(&email) => email,
        _ => return Err(ApiError::bad_request("email is invalid").into()),
    };

    tracing::debug!("email change from {} to {}", user.email, new_email);

    if user.is_ad_user {
        return Err(ApiError::bad_request("The ldap user can not change email.").into());
    }

    let old_email = std::mem::replace(&mut user.email, new_email);

    if let Err(e) = state.users.save(&user).await {
        tracing::warn!("Failed to change email of user {}: {}", user.id, e);
        return Err(ApiError::bad_request("email already in use").into());
    }

    if let Err(e) = state.notifier.notify_email_change(&user, &old_email).await {
        tracing::warn!("Email change notification for {} failed: {}", user.email, e);
    }

    Ok(StatusEnvelope::ok())
}
