use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use axum_helpers::errors::format_validation_errors;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Credential rejected: {0}")]
    InvalidCredential(String),

    /// The provider could not be reached, or went silent for too long.
    #[error("Completion provider unavailable: {0}")]
    Unavailable(String),

    #[error("Completion provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider answered, but not in a shape we understand.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    /// The stream broke after it had started.
    #[error("Completion stream interrupted: {0}")]
    Interrupted(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CompletionResult<T> = Result<T, CompletionError>;

impl CompletionError {
    /// Short label for the `upstream_errors_total` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Validation(_) => "validation",
            CompletionError::InvalidCredential(_) => "credential",
            CompletionError::Unavailable(_) => "unavailable",
            CompletionError::Rejected { .. } => "rejected",
            CompletionError::InvalidResponse(_) => "malformed",
            CompletionError::Interrupted(_) => "interrupted",
            CompletionError::Config(_) => "internal",
        }
    }

    /// Classify a transport error raised while reading an already-open stream.
    pub(crate) fn from_stream_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Unavailable(err.to_string())
        } else {
            CompletionError::Interrupted(err.to_string())
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            CompletionError::Unavailable(err.to_string())
        } else if err.is_decode() {
            CompletionError::InvalidResponse(err.to_string())
        } else {
            CompletionError::Interrupted(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::InvalidResponse(err.to_string())
    }
}

impl From<ValidationErrors> for CompletionError {
    fn from(errors: ValidationErrors) -> Self {
        CompletionError::Validation(format_validation_errors(&errors))
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Validation(msg) => AppError::BadRequest(msg),
            CompletionError::InvalidCredential(_) => AppError::InvalidCredential(err.to_string()),
            CompletionError::Unavailable(_) => AppError::ServiceUnavailable(err.to_string()),
            CompletionError::Rejected { .. }
            | CompletionError::InvalidResponse(_)
            | CompletionError::Interrupted(_) => AppError::BadGateway(err.to_string()),
            CompletionError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
        }
    }
}

impl IntoResponse for CompletionError {
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
    fn test_app_error_status_mapping() {
        let cases = [
            (CompletionError::Validation("empty".into()), StatusCode::BAD_REQUEST),
            (CompletionError::InvalidCredential("key".into()), StatusCode::UNAUTHORIZED),
            (CompletionError::Unavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                CompletionError::Rejected {
                    status: 400,
                    message: "context too long".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (CompletionError::InvalidResponse("x".into()), StatusCode::BAD_GATEWAY),
            (CompletionError::Interrupted("reset".into()), StatusCode::BAD_GATEWAY),
            (CompletionError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = AppError::from(CompletionError::Validation("user_prompt: must not be empty".into()));
        assert_eq!(err.to_string(), "user_prompt: must not be empty");
    }
}
