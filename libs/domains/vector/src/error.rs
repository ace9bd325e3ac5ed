use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Collection {0} not found")]
    CollectionNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Qdrant (or the embedding API) could not be reached or did not answer in time.
    #[error("Vector store unavailable: {0}")]
    Unavailable(String),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Credential rejected: {0}")]
    InvalidCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// Short label for the `upstream_errors_total` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            VectorError::CollectionNotFound(_) => "not_found",
            VectorError::Validation(_) => "validation",
            VectorError::Unavailable(_) => "unavailable",
            VectorError::Qdrant(_) | VectorError::Embedding(_) => "rejected",
            VectorError::InvalidCredential(_) => "credential",
            VectorError::Config(_) | VectorError::Internal(_) => "internal",
        }
    }
}

// gRPC status codes as reported by the Qdrant client.
const GRPC_CANCELLED: i32 = 1;
const GRPC_INVALID_ARGUMENT: i32 = 3;
const GRPC_DEADLINE_EXCEEDED: i32 = 4;
const GRPC_NOT_FOUND: i32 = 5;
const GRPC_PERMISSION_DENIED: i32 = 7;
const GRPC_UNAVAILABLE: i32 = 14;
const GRPC_UNAUTHENTICATED: i32 = 16;

/// Map a gRPC status code and message onto the domain error.
///
/// `NotFound` carries the server message; callers that know the collection
/// name replace it with [`VectorError::CollectionNotFound`].
pub(crate) fn classify_grpc_status(code: i32, message: String) -> VectorError {
    match code {
        GRPC_NOT_FOUND => VectorError::CollectionNotFound(message),
        GRPC_INVALID_ARGUMENT => VectorError::Validation(message),
        GRPC_CANCELLED | GRPC_DEADLINE_EXCEEDED | GRPC_UNAVAILABLE => {
            VectorError::Unavailable(message)
        }
        GRPC_PERMISSION_DENIED | GRPC_UNAUTHENTICATED => VectorError::InvalidCredential(message),
        _ => VectorError::Qdrant(message),
    }
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        use qdrant_client::QdrantError;

        match err {
            QdrantError::ResponseError { status } => {
                classify_grpc_status(status.code() as i32, status.message().to_string())
            }
            other => VectorError::Qdrant(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            VectorError::Unavailable(err.to_string())
        } else {
            VectorError::Embedding(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::CollectionNotFound(_) => AppError::NotFound(err.to_string()),
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::Unavailable(_) => AppError::ServiceUnavailable(err.to_string()),
            VectorError::Qdrant(_) | VectorError::Embedding(_) => {
                AppError::BadGateway(err.to_string())
            }
            VectorError::InvalidCredential(_) => AppError::InvalidCredential(err.to_string()),
            VectorError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            VectorError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_grpc_codes_are_classified() {
        assert!(matches!(
            classify_grpc_status(GRPC_NOT_FOUND, "missing".into()),
            VectorError::CollectionNotFound(_)
        ));
        assert!(matches!(
            classify_grpc_status(GRPC_UNAVAILABLE, "connection refused".into()),
            VectorError::Unavailable(_)
        ));
        assert!(matches!(
            classify_grpc_status(GRPC_DEADLINE_EXCEEDED, "timeout".into()),
            VectorError::Unavailable(_)
        ));
        assert!(matches!(
            classify_grpc_status(GRPC_UNAUTHENTICATED, "bad key".into()),
            VectorError::InvalidCredential(_)
        ));
        assert!(matches!(
            classify_grpc_status(13, "boom".into()),
            VectorError::Qdrant(_)
        ));
    }

    #[test]
    fn test_app_error_status_mapping() {
        let cases = [
            (VectorError::CollectionNotFound("docs".into()), StatusCode::NOT_FOUND),
            (VectorError::Validation("empty".into()), StatusCode::BAD_REQUEST),
            (VectorError::Unavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (VectorError::Qdrant("bad".into()), StatusCode::BAD_GATEWAY),
            (VectorError::InvalidCredential("key".into()), StatusCode::UNAUTHORIZED),
            (VectorError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_not_found_message_names_collection() {
        let err = AppError::from(VectorError::CollectionNotFound("docs".into()));
        assert_eq!(err.to_string(), "Collection docs not found");
    }
}
