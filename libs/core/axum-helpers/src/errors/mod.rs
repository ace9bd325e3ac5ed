pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::envelope::{ApiEnvelope, NoParams};

/// Application error type rendered as the `{results, params, error}` envelope.
///
/// Domain errors convert into this type; the HTTP status carries the error
/// class while the envelope's `error` field carries the message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}", .0.body_text())]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("{}", format_validation_errors(.0))]
    ValidationError(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SerdeJson(_) | AppError::Io(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::QueryExtractorRejection(e) => e.status(),
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::SerdeJson(_) => ErrorCode::SerdeJsonError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::QueryExtractorRejection(_) => ErrorCode::InvalidQuery,
            AppError::ValidationError(_) | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::InvalidCredential(_) => ErrorCode::InvalidCredential,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::BadGateway(_) => ErrorCode::UpstreamRejected,
            AppError::ServiceUnavailable(_) => ErrorCode::UpstreamUnavailable,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }

    /// Render the error inside an envelope that echoes the request parameters.
    pub fn into_envelope_response<P: Serialize>(self, params: P) -> Response {
        let status = self.status();
        let code = self.code();

        // Internal details stay in the logs; clients get the generic message.
        let message = if status.is_server_error() && !self.is_upstream() {
            tracing::error!(error_code = code.code(), error = %self, "Unclassified failure");
            code.default_message().to_string()
        } else if status.is_server_error() {
            tracing::warn!(error_code = code.code(), error = %self, "Upstream failure");
            self.to_string()
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
            self.to_string()
        };

        let body = ApiEnvelope::<(), P>::failed(params, message);
        (status, axum::Json(body)).into_response()
    }

    fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::BadGateway(_) | AppError::ServiceUnavailable(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_envelope_response(NoParams)
    }
}

/// Flatten validator output into `field: message` pairs, sorted by field name.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
