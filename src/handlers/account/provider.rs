// handlers/account/provider.rs - PUT/DELETE /account/:provider/:id handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{ProviderAccount, Upsert, UserPatch};
use crate::state::AppState;

/// PUT /account/:provider/:id - Update Provider Account
///
/// Stores a provider account for the signed-in user. An existing entry with
/// the same (provider, id) is replaced, otherwise the account is appended.
/// The payload is kept as given; only the route key is forced onto it.
///
/// Responds `200 OK` for both the replace and the append case.
pub async fn upsert_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((provider, id)): Path<(String, String)>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let account = ProviderAccount::from_payload(&provider, &id, payload);
    let (accounts, outcome) = user.accounts.upsert(account);

    match outcome {
        Upsert::Replaced(index) => {
            tracing::debug!("replacing {} account {} at {} for {}", provider, id, index, user.email)
        }
        Upsert::Appended => {
            tracing::debug!("adding {} account {} for {}", provider, id, user.email)
        }
    }

    state
        .users
        .update_fields(user.id, UserPatch::accounts(accounts))
        .await
        .map_err(|e| {
            tracing::error!("Failed to save accounts of user {}: {}", user.id, e);
            ApiError::internal_server_error("Failed to save one user")
        })?;

    Ok((StatusCode::OK, "OK"))
}

/// DELETE /account/:provider/:id - Delete Provider Account
///
/// Refused with 403 while any project is linked to `provider`. Note the
/// lookup compares a project's `provider.id` against the provider *name*
/// from the route, not the account id.
///
/// Every entry matching (provider, id) is removed. Responds `204` when at
/// least one was, `404` otherwise.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    Path((provider, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let projects = state.projects.find_by_provider_id(&provider).await.map_err(|e| {
        tracing::error!("Failed to look up projects for provider {}: {}", provider, e);
        ApiError::bad_request("Failed do to bad data")
    })?;

    if !projects.is_empty() {
        let names: Vec<&str> = projects.iter().map(|project| project.name.as_str()).collect();
        return Err(ApiError::forbidden(format!(
            "Cannot delete provider since projects are using this provider: {}",
            names.join(", ")
        )));
    }

    let (accounts, removed) = user.accounts.remove_all(&provider, &id);
    if removed == 0 {
        return Err(ApiError::not_found("Account not found"));
    }

    tracing::debug!("removing {} {} account(s) {} for {}", removed, provider, id, user.email);
    user.accounts = accounts;

    state.users.save(&user).await.map_err(|e| {
        tracing::error!("Failed to save user {}: {}", user.id, e);
        ApiError::internal_server_error("Failed to save user")
    })?;

    Ok(StatusCode::NO_CONTENT)
}
