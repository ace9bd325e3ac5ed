use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use axum_helpers::errors::format_validation_errors;
use domain_completion::CompletionError;
use domain_vector::VectorError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum QueryingError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Vector(#[from] VectorError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type QueryingResult<T> = Result<T, QueryingError>;

impl From<ValidationErrors> for QueryingError {
    fn from(errors: ValidationErrors) -> Self {
        QueryingError::Validation(format_validation_errors(&errors))
    }
}

impl From<QueryingError> for AppError {
    fn from(err: QueryingError) -> Self {
        match err {
            QueryingError::Validation(msg) => AppError::BadRequest(msg),
            QueryingError::Vector(e) => e.into(),
            QueryingError::Completion(e) => e.into(),
            QueryingError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for QueryingError {
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
    fn test_wrapped_errors_keep_their_status() {
        let not_found = QueryingError::from(VectorError::CollectionNotFound("docs".into()));
        assert_eq!(AppError::from(not_found).status(), StatusCode::NOT_FOUND);

        let credential = QueryingError::from(CompletionError::InvalidCredential("key".into()));
        assert_eq!(AppError::from(credential).status(), StatusCode::UNAUTHORIZED);

        let invalid = QueryingError::Validation("question: must not be empty".into());
        assert_eq!(AppError::from(invalid).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_transparent_message() {
        let err = QueryingError::from(VectorError::CollectionNotFound("docs".into()));
        assert_eq!(err.to_string(), "Collection docs not found");
    }
}
