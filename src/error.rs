//! Error types for the protective layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Fetch Error ==
/// Failure of a wrapped data-store operation.
///
/// Mirrors what the remote data store reports: an optional HTTP-like status
/// and a message. Retry classification reads both fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    /// Status code reported by the backend, if any
    pub status: Option<u16>,
    /// Backend message
    pub message: String,
}

impl FetchError {
    /// Creates a failure without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a failure carrying a status code.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

// == Shield Error Enum ==
/// Unified error type for the protective layer and its HTTP surface.
#[derive(Error, Debug)]
pub enum ShieldError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller exceeded its quota; `blocked_until` is the cooldown deadline (ms)
    #[error("Rate limited until {blocked_until:?}")]
    RateLimited { blocked_until: Option<u64> },

    /// The session was forcibly signed out
    #[error("Session terminated: {0}")]
    SessionTerminated(String),

    /// Wrapped operation failed after retry handling
    #[error("Upstream failure: {0}")]
    Upstream(#[from] FetchError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShieldError {
    /// Short message safe to show to an end user.
    pub fn public_message(&self) -> String {
        match self {
            ShieldError::InvalidRequest(msg) => msg.clone(),
            ShieldError::RateLimited { .. } => {
                "Too many requests. Please wait before trying again.".to_string()
            }
            ShieldError::SessionTerminated(_) => {
                "Your session has ended. Please sign in again.".to_string()
            }
            ShieldError::Upstream(_) => "The request could not be completed.".to_string(),
            ShieldError::Internal(_) => "Something went wrong.".to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ShieldError {
    fn into_response(self) -> Response {
        let status = match &self {
            ShieldError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ShieldError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ShieldError::SessionTerminated(_) => StatusCode::UNAUTHORIZED,
            ShieldError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ShieldError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse::new(self.public_message()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the protective layer.
pub type Result<T> = std::result::Result<T, ShieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_detail() {
        let err = ShieldError::Upstream(FetchError::with_status(
            500,
            "relation \"advisors\" does not exist",
        ));
        assert!(!err.public_message().contains("advisors"));
        assert!(err.to_string().contains("advisors"));
    }

    #[test]
    fn test_status_codes() {
        let resp = ShieldError::RateLimited { blocked_until: Some(10) }.into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let resp = ShieldError::InvalidRequest("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ShieldError::SessionTerminated("s1".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = ShieldError::Internal("lock poisoned".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_fetch_error_converts() {
        let err: ShieldError = FetchError::new("timeout").into();
        assert!(matches!(err, ShieldError::Upstream(_)));
    }
}
