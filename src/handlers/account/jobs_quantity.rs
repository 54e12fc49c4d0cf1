// handlers/account/jobs_quantity.rs - POST /account/jobsQuantityOnPage handler

use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::Number;

use crate::error::ApiError;
use crate::extract::FormJson;
use crate::middleware::{CurrentUser, EnvelopeResult, StatusEnvelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobsQuantityRequest {
    pub quantity: Option<Number>,
}

/// Integral value of a JSON number; `20.0` counts, `10.5` does not.
/// Values beyond `i64` saturate, which keeps them out of any configured range.
fn as_whole_number(number: &Number) -> Option<i64> {
    match number.as_i64() {
        Some(value) => Some(value),
        None => number
            .as_f64()
            .filter(|value| value.fract() == 0.0)
            .map(|value| value as i64),
    }
}

/// POST /account/jobsQuantityOnPage - Change jobs quantity on page
///
/// Expected Input:
/// ```json
/// { "quantity": 20 }
/// ```
///
/// Any whole JSON number is accepted; a fractional one is rejected.
pub async fn change_jobs_quantity_on_page(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    FormJson(body): FormJson<JobsQuantityRequest>,
) -> EnvelopeResult {
    let limits = &state.jobs_quantity_on_page;

    if !limits.enabled {
        return Err(ApiError::bad_request("quantity customization is disabled").into());
    }

    let out_of_range = || {
        ApiError::bad_request(format!(
            "quantity must be between {} and {}",
            limits.min, limits.max
        ))
    };

    let quantity = match body.quantity.as_ref() {
        Some(number) => as_whole_number(number)
            .ok_or_else(|| ApiError::bad_request("quantity must be a whole number"))?,
        None => return Err(out_of_range().into()),
    };

    if !limits.contains(quantity) {
        return Err(out_of_range().into());
    }

    tracing::debug!(
        "jobs quantity on page change from {} to {}",
        user.jobs_quantity_on_page,
        quantity
    );
    user.jobs_quantity_on_page = quantity;

    state.users.save(&user).await.map_err(|e| {
        tracing::error!("Failed to save jobs quantity of user {}: {}", user.id, e);
        ApiError::internal_server_error("Failed to save user")
    })?;

    Ok(StatusEnvelope::ok())
}
