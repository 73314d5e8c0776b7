//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache server.
///
/// Negative lookups inside the engine are plain `Option`s; `NotFound` only
/// exists once a miss has to be reported over HTTP.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired
    #[error("Key \"{0}\" not found")]
    NotFound(String),

    /// TTL string could not be parsed as a duration
    #[error("Invalid TTL format specified: {0}")]
    InvalidTtl(String),

    /// Request body could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Action queue is full, retry later
    #[error("Action queue is full, try again later")]
    QueueFull,

    /// The consumer side of the action queue has gone away
    #[error("Action dispatcher is not running")]
    DispatcherClosed,

    /// Invalid startup configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// `serve` was called on a server that is already serving
    #[error("Server already running")]
    AlreadyRunning,

    /// `serve` was called on a server that has already shut down
    #[error("Server has been stopped")]
    Stopped,

    /// Socket level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure talking to a remote server
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error status reported by a remote server
    #[error("Server responded with {status}: {message}")]
    Remote { status: u16, message: String },
}

impl CacheError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidTtl(_) => StatusCode::NOT_ACCEPTABLE,
            CacheError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::QueueFull => StatusCode::TOO_MANY_REQUESTS,
            CacheError::DispatcherClosed => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Config(_)
            | CacheError::AlreadyRunning
            | CacheError::Stopped
            | CacheError::Io(_)
            | CacheError::Http(_)
            | CacheError::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for conditions a caller should simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheError::QueueFull)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        if self.is_retryable() {
            return (status, [(header::RETRY_AFTER, "1")], body).into_response();
        }

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
