//! Health check HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::web::AppState;

/// Liveness endpoint: `ok` when the store answers, 503 otherwise.
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.ping().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "Database connection failed").into_response()
        }
    }
}
