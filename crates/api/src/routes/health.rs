//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// Liveness: the process is serving requests.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the store answers.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "ready": true, "store": store.kind() })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, store = store.kind(), "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable").into_response()
        }
    }
}
