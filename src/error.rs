//! Error types for the cache
//!
//! Storage backends report failures through [`StorageError`]. The cache never
//! surfaces those to its callers; they only reach the logs. The HTTP layer has
//! its own [`CacheError`] that maps onto status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error Enum ==
/// Failure raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write would exceed the backend's byte quota
    #[error("Quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted backend data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding the backend was poisoned by a panicking writer
    #[error("Storage lock poisoned: {0}")]
    Poisoned(String),

    /// The backend refuses all operations
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned(err.to_string())
    }
}

/// Result type returned by storage backends.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// == Cache Error Enum ==
/// Error type for the HTTP API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key missing, stale, or no backend to read from
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No storage backend accepted the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, CacheError>;
