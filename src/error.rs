//! Error types
//!
//! The cache itself never fails; these cover the live-sync subscription and
//! the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Sync Error Enum ==
/// Failures of a change-feed subscription. Any of these ends the subscription.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The feed's transport failed
    #[error("Feed transport error: {0}")]
    Transport(String),

    /// A feed message could not be parsed into a document snapshot
    #[error("Malformed snapshot: {0}")]
    Decode(String),

    /// A field's value does not have the cache's value type
    #[error("Value type mismatch for field '{field}': {reason}")]
    TypeMismatch { field: String, reason: String },

    /// The feed ended before delivering its first snapshot
    #[error("Feed closed before the first snapshot")]
    FeedClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background sync task panicked or was cancelled
    #[error("Sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == API Error Enum ==
/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
