//! Cached-domain listing handler

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::errors::AppError;
use crate::web::AppState;

/// Seconds a `/domains` listing may be cached by clients
const LIST_CACHE_TTL_SECS: u64 = 300;

/// `GET /domains` - operational view of everything currently cached,
/// newest first.
pub async fn list_domains(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Err(e) = state.repository.ping().await {
        tracing::error!("Domain listing unavailable: {e}");
        return Ok(
            (StatusCode::SERVICE_UNAVAILABLE, "Database connection failed").into_response(),
        );
    }

    let summaries = state.repository.list().await?;

    Ok((
        [(
            header::CACHE_CONTROL.as_str(),
            format!("public, max-age={LIST_CACHE_TTL_SECS}, must-revalidate"),
        )],
        Json(summaries),
    )
        .into_response())
}
