//! Error type definitions for the favicon proxy application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the
/// application. It uses `thiserror` to provide automatic error trait
/// implementations and proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (sqlx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Outbound fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Web layer errors
    #[error("Web error: {0}")]
    Web(#[from] WebError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failures
    #[error("Migration failed: {name} - {message}")]
    MigrationFailed { name: String, message: String },
}

/// Errors from a single outbound probe
///
/// All of these are expected in normal operation. They are swallowed by the
/// resolver and only ever surfaced at debug level.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, TLS, read, client timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// Remote answered with a content type outside the image allow-list
    #[error("Invalid content type: {content_type}")]
    InvalidContentType { content_type: String },
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Invalid request format
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
