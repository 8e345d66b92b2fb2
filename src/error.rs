//! Relay error types with HTTP status code mapping.
//!
//! [`ChatError`] is the central error type. REST handlers turn it into a
//! structured JSON response; the WebSocket layer turns it into an `error`
//! frame and keeps the connection open.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no active session for user: bob"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
/// | 2000–2999 | Not Found  | 404 Not Found             |
/// | 3000–3999 | Server     | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Frame was not valid JSON or not a known command.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Chat payload failed validation.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Destination path is syntactically invalid or not allowed here.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// No handler is registered for the inbound destination.
    #[error("no handler for destination: {0}")]
    UnknownDestination(String),

    /// Unsubscribe referenced a subscription id this connection never used.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(String),

    /// No live session is bound to the username.
    #[error("no active session for user: {0}")]
    UserNotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedFrame(_) => 1001,
            Self::InvalidMessage(_) => 1002,
            Self::InvalidDestination(_) => 1003,
            Self::UnknownDestination(_) => 2001,
            Self::UnknownSubscription(_) => 2002,
            Self::UserNotFound(_) => 2003,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedFrame(_) | Self::InvalidMessage(_) | Self::InvalidDestination(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownDestination(_) | Self::UnknownSubscription(_) | Self::UserNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedFrame(err.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
