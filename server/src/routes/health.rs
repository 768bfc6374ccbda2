//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
}

/// Health check handler. Reports `degraded` when the store cannot be read.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, store) = match state.store.get("health:probe").await {
        Ok(_) => ("ok", "reachable"),
        Err(e) => {
            tracing::warn!("Health probe failed: {}", e);
            ("degraded", "unreachable")
        }
    };
    Json(HealthResponse {
        status,
        store,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Root handler.
async fn root() -> &'static str {
    "Moocho API is running"
}
