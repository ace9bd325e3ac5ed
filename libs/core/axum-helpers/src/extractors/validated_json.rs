//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `Validate` after deserializing.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CompletionParams {
///     #[validate(length(min = 1))]
///     user_prompt: String,
/// }
///
/// async fn complete(ValidatedJson(params): ValidatedJson<CompletionParams>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Prompt {
        #[validate(length(min = 1, message = "must not be empty"))]
        user_prompt: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(p): ValidatedJson<Prompt>| async move { p.user_prompt }),
        )
    }

    fn post_json(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_body() {
        let response = app().oneshot(post_json(r#"{"user_prompt":"hi"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_empty_field() {
        let response = app().oneshot(post_json(r#"{"user_prompt":""}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_missing_field() {
        let response = app().oneshot(post_json(r#"{}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
