//! Failure taxonomy shared by the transport and everything above it.
//!
//! The transport never panics and never leaks raw reqwest errors: every
//! failure a caller can see is one of these variants. Only `Auth` has a
//! cross-cutting side effect (the stored token is cleared before the
//! error is returned).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error types for client operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response reached the client (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 401 - the session is invalid or expired.
    #[error("unauthorized")]
    Auth,

    /// Non-2xx HTTP status, with the envelope message when one was parseable.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx transport but the envelope carried a non-zero code.
    #[error("{message} (code {code})")]
    Business { code: i32, message: String },

    /// 2xx transport but the body was not a well-formed envelope.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A tracked operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status associated with this failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure came from the envelope rather than the transport.
    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(ApiError::Auth.to_string(), "unauthorized");
        assert_eq!(
            ApiError::Http {
                status: 500,
                message: "boom".to_string()
            }
            .to_string(),
            "HTTP 500: boom"
        );
        assert_eq!(
            ApiError::Business {
                code: 1002,
                message: "bad library".to_string()
            }
            .to_string(),
            "bad library (code 1002)"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Auth.status(), Some(401));
        assert_eq!(
            ApiError::Http {
                status: 404,
                message: "missing".to_string()
            }
            .status(),
            Some(404)
        );
        assert_eq!(ApiError::Network("refused".to_string()).status(), None);
        assert!(!ApiError::Cancelled.is_business());
    }
}
