use axum::Router;
use domain_completion::CompletionService;
use domain_querying::QueryService;
use domain_vector::VectorService;

use crate::state::AppState;

pub mod health;
pub mod status;

/// All public API routes, mounted at the root.
///
/// Every domain router gets its own service over the shared clients, so the
/// returned router is stateless and can be merged with the docs router.
pub fn routes(state: &AppState) -> Router {
    let vectors = VectorService::new(state.store.clone());
    let completions = CompletionService::new(state.llm.clone());
    let querying = QueryService::new(
        VectorService::new(state.store.clone())
            .with_embedding_provider(state.embeddings.clone()),
        CompletionService::new(state.llm.clone()),
    );

    Router::new()
        .merge(status::router())
        .merge(domain_vector::handlers::router(vectors))
        .merge(domain_completion::handlers::router(completions))
        .merge(domain_querying::handlers::router(querying))
}

/// Router with the `/ready` endpoint, which needs the live Qdrant client.
pub fn ready_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use core_config::{app_info, server::ServerConfig};
    use domain_completion::OpenAiConfig;
    use domain_vector::{OpenAIEmbeddingConfig, QdrantConfig};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    // Nothing listens on port 1, so every upstream call fails fast.
    const DEAD_UPSTREAM: &str = "http://127.0.0.1:1";

    fn offline_state() -> AppState {
        let config = Config {
            app: app_info!(),
            server: ServerConfig::default(),
            environment: Environment::Development,
            qdrant: QdrantConfig::new(DEAD_UPSTREAM).with_timeout(Duration::from_secs(2)),
            openai: OpenAiConfig::new("sk-test")
                .with_base_url(DEAD_UPSTREAM)
                .with_available_models(vec!["gpt-4o".to_string()]),
            embeddings: OpenAIEmbeddingConfig::new("sk-test").with_base_url(DEAD_UPSTREAM),
        };
        AppState::new(config).unwrap()
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_routes_expose_available_llms() {
        let (status, body) = call(routes(&offline_state()), get("/available-llms/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "");
        assert_eq!(body["results"]["gpt-4o-mini"]["is_default"], true);
        assert_eq!(body["results"]["gpt-4o"]["is_default"], false);
    }

    #[tokio::test]
    async fn test_check_openai_degrades_to_false() {
        let (status, body) = call(routes(&offline_state()), get("/check-openai/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], false);
        assert_eq!(body["params"], "");
    }

    #[tokio::test]
    async fn test_completion_rejects_blank_prompt() {
        let request = Request::builder()
            .method("POST")
            .uri("/openai-completion/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"user_prompt": "   "}"#))
            .unwrap();

        let (status, body) = call(routes(&offline_state()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["results"], Value::Null);
        assert!(body["error"].as_str().unwrap().contains("user_prompt"));
    }

    #[tokio::test]
    async fn test_unreachable_qdrant_is_an_upstream_error() {
        let (status, body) = call(routes(&offline_state()), get("/get-all-collections/")).await;

        assert!(status.is_server_error());
        assert_eq!(body["results"], Value::Null);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ready_reports_qdrant_down() {
        let (status, body) = call(ready_router(offline_state()), get("/ready")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["qdrant"], "disconnected");
    }
}
