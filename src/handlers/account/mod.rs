// handlers/account/mod.rs - Account sub-resources of the signed-in user
//
// Route Prefix: /account
// Middleware: require_user on every route, csrf_protection on the form posts

pub mod csrf;
pub mod email;
pub mod jobs_quantity;
pub mod password;
pub mod provider;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::middleware::{csrf_protection, require_user};
use crate::state::AppState;

pub use csrf::csrf_token;
pub use email::change_email;
pub use jobs_quantity::change_jobs_quantity_on_page;
pub use password::change_password;
pub use provider::{delete_account, upsert_account};

pub fn routes(state: AppState) -> Router<AppState> {
    let forms = Router::new()
        .route("/password", post(change_password))
        .route("/email", post(change_email))
        .route("/jobsQuantityOnPage", post(change_jobs_quantity_on_page))
        .layer(from_fn_with_state(state.clone(), csrf_protection));

    Router::new()
        .route("/csrf", get(csrf_token))
        .route("/:provider/:id", put(upsert_account).delete(delete_account))
        .merge(forms)
        .layer(from_fn_with_state(state, require_user))
}
