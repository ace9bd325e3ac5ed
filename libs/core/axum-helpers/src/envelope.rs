//! The `{results, params, error}` response envelope shared by every JSON endpoint.
//!
//! Successful calls carry `results` and an empty `error`; failures carry
//! `results: null` and the error message. `params` echoes the validated
//! request parameters, or is the empty string for parameterless endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiEnvelope<T, P> {
    pub results: Option<T>,
    pub params: P,
    #[serde(default)]
    pub error: String,
}

impl<T, P> ApiEnvelope<T, P> {
    pub fn ok(params: P, results: T) -> Self {
        Self {
            results: Some(results),
            params,
            error: String::new(),
        }
    }

    pub fn failed(params: P, error: impl Into<String>) -> Self {
        Self {
            results: None,
            params,
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

impl<T: Serialize, P: Serialize> IntoResponse for ApiEnvelope<T, P> {
    fn into_response(self) -> Response {
        let status = if self.is_ok() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

/// Turn a domain result into an envelope response, echoing `params` either way.
pub fn respond<T, P, E>(params: P, result: Result<T, E>) -> Response
where
    T: Serialize,
    P: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(results) => ApiEnvelope::ok(params, results).into_response(),
        Err(err) => err.into().into_envelope_response(params),
    }
}

/// Placeholder for endpoints without parameters; serializes as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl Serialize for NoParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

impl<'de> Deserialize<'de> for NoParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoParams)
    }
}

impl utoipa::PartialSchema for NoParams {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::String)
            .description(Some("Always the empty string"))
            .into()
    }
}

impl ToSchema for NoParams {}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[derive(Serialize)]
    struct Params {
        collection_name: String,
    }

    #[test]
    fn test_ok_envelope_shape() {
        let envelope = ApiEnvelope::ok(NoParams, vec!["docs".to_string()]);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"results": ["docs"], "params": "", "error": ""})
        );
    }

    #[test]
    fn test_failed_envelope_shape() {
        let envelope = ApiEnvelope::<bool, _>::failed(NoParams, "boom");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"results": null, "params": "", "error": "boom"}));
        assert!(!envelope.is_ok());
    }

    #[test]
    fn test_no_params_deserializes_from_anything() {
        let envelope: ApiEnvelope<bool, NoParams> =
            serde_json::from_value(json!({"results": true, "params": {"x": 1}})).unwrap();
        assert_eq!(envelope.results, Some(true));
        assert!(envelope.is_ok());
    }

    #[tokio::test]
    async fn test_respond_echoes_params() {
        let params = Params {
            collection_name: "docs".into(),
        };
        let response = respond(params, Ok::<_, AppError>(true));
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["params"]["collection_name"], "docs");
        assert_eq!(value["results"], true);
        assert_eq!(value["error"], "");
    }

    #[tokio::test]
    async fn test_respond_maps_error_status() {
        let response = respond(
            NoParams,
            Err::<bool, _>(AppError::InvalidCredential("bad key".into())),
        );
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
