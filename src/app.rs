use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::account;
use crate::state::AppState;

/// Full HTTP surface; `/account` is the only protected group
pub fn app(state: AppState) -> Router {
    let cors = if crate::is_development!() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-csrf-token"),
            ])
            .allow_credentials(true)
    };

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected
        .nest("/account", account::routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Account API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "csrf": "GET /account/csrf (protected)",
                "provider_accounts": "PUT|DELETE /account/:provider/:id (protected)",
                "password": "POST /account/password (protected, csrf)",
                "email": "POST /account/email (protected, csrf)",
                "jobs_quantity_on_page": "POST /account/jobsQuantityOnPage (protected, csrf)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
