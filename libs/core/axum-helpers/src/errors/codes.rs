//! Type-safe error codes used in structured logs.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier, an integer for
//! dashboards/alerts, and a default human-readable message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::UpstreamUnavailable;
//! assert_eq!(code.as_str(), "UPSTREAM_UNAVAILABLE");
//! assert_eq!(code.code(), 3001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// A required field is missing or empty
    ValidationError,

    /// Request body is not valid JSON for the endpoint
    InvalidJson,

    /// Query string could not be deserialized
    InvalidQuery,

    /// Requested resource (e.g. a collection) does not exist
    NotFound,

    /// Configured provider credential was rejected
    InvalidCredential,

    // Server errors (2000-2999)
    /// Unclassified failure
    InternalError,

    /// JSON serialization/deserialization error
    SerdeJsonError,

    /// I/O error
    IoError,

    // Upstream errors (3000-3999)
    /// Vector database or model provider could not be reached in time
    UpstreamUnavailable,

    /// Upstream answered with an error status
    UpstreamRejected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::InternalError => "INTERNAL_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
            Self::IoError => "IO_ERROR",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamRejected => "UPSTREAM_REJECTED",
        }
    }

    /// Integer code for logs and metrics.
    ///
    /// - 1000-1999: client errors
    /// - 2000-2999: server errors
    /// - 3000-3999: upstream errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1002,
            Self::InvalidQuery => 1003,
            Self::NotFound => 1004,
            Self::InvalidCredential => 1005,

            Self::InternalError => 2001,
            Self::SerdeJsonError => 2002,
            Self::IoError => 2003,

            Self::UpstreamUnavailable => 3001,
            Self::UpstreamRejected => 3002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON format",
            Self::InvalidQuery => "Invalid query string",
            Self::NotFound => "Resource not found",
            Self::InvalidCredential => "Provider credential is not usable",
            Self::InternalError => "An internal server error occurred",
            Self::SerdeJsonError => "JSON serialization error",
            Self::IoError => "I/O error occurred",
            Self::UpstreamUnavailable => "Upstream service is unavailable",
            Self::UpstreamRejected => "Upstream service rejected the request",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ranges() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::InternalError.code(), 2001);
        assert_eq!(ErrorCode::UpstreamUnavailable.code(), 3001);
    }

    #[test]
    fn test_error_code_display_matches_serde() {
        let code = ErrorCode::InvalidCredential;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, format!("\"{}\"", code));
    }

    #[test]
    fn test_error_code_deserialization() {
        let code: ErrorCode = serde_json::from_str("\"UPSTREAM_REJECTED\"").unwrap();
        assert_eq!(code, ErrorCode::UpstreamRejected);
    }
}
