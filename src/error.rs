//! Request-level error taxonomy
//!
//! Failures are recovered as close to their source as possible; only the
//! variants here ever reach the HTTP surface. The body shape is the flat
//! `{"error": "..."}` object the web client consumes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::assembler::AssembleError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A required upstream credential is not configured (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The candidate pool came back empty after every fallback (500)
    #[error("No similar songs could be found for these seeds")]
    NoCandidates,

    /// Zero tracks survived verification and every recovery budget (500)
    #[error("No verified songs could be found for this request")]
    EmptyPlaylist,

    /// Anything else (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NoCandidates | ApiError::EmptyPlaylist | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

impl From<AssembleError> for ApiError {
    fn from(err: AssembleError) -> Self {
        match err {
            AssembleError::NoCandidates => ApiError::NoCandidates,
            AssembleError::EmptyPlaylist => ApiError::EmptyPlaylist,
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
