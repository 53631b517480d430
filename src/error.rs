//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Source Error Enum ==
/// Failure reported by the underlying record source.
///
/// Cloneable so a single failed fetch can be handed to every caller that
/// was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not answer the lookup
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The fetch task died before producing a result
    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

// == App Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client exceeded its request allowance
    #[error("Too many requests. Rate limit exceeded.")]
    RateLimited,

    /// No record exists for the requested key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Malformed input rejected before touching the cache
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The record source failed
    #[error(transparent)]
    Source(#[from] SourceError),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Source(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, AppError>;
