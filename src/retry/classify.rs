//! Error classification for the retry policy.

use crate::error::FetchError;

/// Status codes that never succeed on a second attempt.
const NON_RETRYABLE_STATUS: [u16; 3] = [401, 403, 422];

/// Message fragments (lowercase) signalling an auth failure.
const AUTH_FAILURE_MARKERS: [&str; 4] = [
    "unauthorized",
    "unauthenticated",
    "not authorized",
    "jwt expired",
];

// == Error Class ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network or server trouble; worth another attempt
    Transient,
    /// Authentication, authorization or validation failure
    NonRetryable,
}

/// Errors that can tell the retry policy whether another attempt may help.
pub trait Retryable {
    fn error_class(&self) -> ErrorClass;

    fn is_retryable(&self) -> bool {
        self.error_class() == ErrorClass::Transient
    }
}

impl Retryable for FetchError {
    fn error_class(&self) -> ErrorClass {
        if let Some(status) = self.status {
            if NON_RETRYABLE_STATUS.contains(&status) {
                return ErrorClass::NonRetryable;
            }
        }

        let message = self.message.to_lowercase();
        if AUTH_FAILURE_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
        {
            return ErrorClass::NonRetryable;
        }

        ErrorClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_and_validation_status_not_retryable() {
        for status in [401, 403, 422] {
            let err = FetchError::with_status(status, "nope");
            assert_eq!(err.error_class(), ErrorClass::NonRetryable, "status {}", status);
        }
    }

    #[test]
    fn test_server_errors_retryable() {
        for status in [500, 502, 503, 429, 404] {
            assert!(FetchError::with_status(status, "boom").is_retryable());
        }
        assert!(FetchError::new("connection reset by peer").is_retryable());
    }

    #[test]
    fn test_auth_message_not_retryable() {
        assert!(!FetchError::new("User is Unauthorized").is_retryable());
        assert!(!FetchError::new("JWT expired").is_retryable());
        assert!(!FetchError::with_status(500, "request unauthenticated").is_retryable());
    }
}
