//! Centralized error handling for the favicon proxy application
//!
//! This module provides a unified error system across all application
//! layers. The web layer maps these errors onto HTTP status codes in one
//! place so handlers can use `?` freely.
//!
//! # Error Categories
//!
//! - **Database Errors**: SQLite operations, migrations, connection issues
//! - **Repository Errors**: Cache table access failures
//! - **Fetch Errors**: Outbound probe connectivity and validation failures
//! - **Validation Errors**: Caller input problems
//! - **Web Errors**: HTTP request/response handling issues

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for fetch Results
pub type FetchResult<T> = Result<T, FetchError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Web(WebError::InvalidRequest { field, message }) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request: {field} - {message}"),
            ),
            // The service cannot answer without its store.
            AppError::Database(_) | AppError::Repository(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database connection failed".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        (status, message).into_response()
    }
}
