//! Error types for dirlink operations.
//!
//! This module provides the error hierarchy for the directory-connection
//! component, including stable error codes and a structured response shape
//! for the embedding application's action runner.

use serde::Serialize;
use thiserror::Error;

/// Main error type for dirlink operations.
///
/// The three handshake variants ([`Error::Transport`],
/// [`Error::SecureChannel`], [`Error::Bind`]) deliberately render distinct
/// messages so an operator can tell which step of a connection test failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No usable connection settings exist
    #[error("Directory connection is not configured: {0}")]
    NotConfigured(String),

    /// A write would leave the settings record invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Could not open the network connection to the directory server
    #[error("Could not connect to the directory server: {0}")]
    Transport(String),

    /// Start TLS negotiation failed after the connection was opened
    #[error("Could not secure the directory channel: {0}")]
    SecureChannel(String),

    /// The directory server refused the bind
    #[error("Could not authenticate against the directory: {0}")]
    Bind(String),

    /// The settings store itself failed
    #[error("Settings store error: {0}")]
    Store(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specialized result type for dirlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for serialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
    /// Optional request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail structure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::SecureChannel(_) => "SECURE_CHANNEL_ERROR",
            Self::Bind(_) => "BIND_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts the error into an [`ErrorResponse`].
    #[must_use]
    pub fn into_error_response(self) -> ErrorResponse {
        self.into_error_response_with_id(None)
    }

    /// Converts the error into an [`ErrorResponse`] with a request ID.
    #[must_use]
    pub fn into_error_response_with_id(self, request_id: Option<String>) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: None,
            },
            request_id,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

// Conversions from external error types
impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::NotConfigured("test".to_string()).error_code(),
            "NOT_CONFIGURED"
        );
        assert_eq!(
            Error::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::Transport("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(
            Error::SecureChannel("test".to_string()).error_code(),
            "SECURE_CHANNEL_ERROR"
        );
        assert_eq!(Error::Bind("test".to_string()).error_code(), "BIND_ERROR");
        assert_eq!(Error::Store("test".to_string()).error_code(), "STORE_ERROR");
        assert_eq!(
            Error::Internal("test".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Could not connect to the directory server: connection refused"
        );

        let err = Error::SecureChannel("handshake rejected".to_string());
        assert_eq!(
            err.to_string(),
            "Could not secure the directory channel: handshake rejected"
        );

        let err = Error::Bind("invalid credentials".to_string());
        assert_eq!(
            err.to_string(),
            "Could not authenticate against the directory: invalid credentials"
        );
    }

    #[test]
    fn test_handshake_steps_render_distinct_messages() {
        let transport = Error::Transport("x".to_string()).to_string();
        let secure = Error::SecureChannel("x".to_string()).to_string();
        let bind = Error::Bind("x".to_string()).to_string();

        assert_ne!(transport, secure);
        assert_ne!(secure, bind);
        assert_ne!(transport, bind);
    }

    #[test]
    fn test_into_error_response() {
        let err = Error::NotConfigured("no server set".to_string());
        let response = err.clone().into_error_response();

        assert_eq!(response.error.code, "NOT_CONFIGURED");
        assert_eq!(
            response.error.message,
            "Directory connection is not configured: no server set"
        );
        assert!(response.request_id.is_none());

        let response_with_id = err.into_error_response_with_id(Some("req-456".to_string()));
        assert_eq!(response_with_id.request_id, Some("req-456".to_string()));
    }

    #[test]
    fn test_should_log() {
        assert!(Error::Store("test".to_string()).should_log());
        assert!(Error::Internal("test".to_string()).should_log());

        assert!(!Error::NotConfigured("test".to_string()).should_log());
        assert!(!Error::Validation("test".to_string()).should_log());
        assert!(!Error::Transport("test".to_string()).should_log());
        assert!(!Error::Bind("test".to_string()).should_log());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let dirlink_err: Error = err.into();
        assert!(matches!(dirlink_err, Error::Validation(_)));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: ErrorDetail {
                code: "TEST_ERROR".to_string(),
                message: "Test message".to_string(),
                details: None,
            },
            request_id: Some("req-123".to_string()),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("TEST_ERROR"));
        assert!(json.contains("Test message"));
        assert!(json.contains("req-123"));
    }

    #[test]
    fn test_error_response_serialization_no_request_id() {
        let response = ErrorResponse {
            error: ErrorDetail {
                code: "TEST_ERROR".to_string(),
                message: "Test message".to_string(),
                details: None,
            },
            request_id: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("request_id"));
    }

    #[test]
    fn test_error_clone_and_eq() {
        let err = Error::Bind("test".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);

        assert_ne!(
            Error::Bind("test".to_string()),
            Error::Bind("other".to_string())
        );
    }
}
