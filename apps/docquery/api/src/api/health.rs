//! Readiness check against the vector database.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_vector::VectorStore;

/// `/ready`: 200 when Qdrant answers its health check, 503 otherwise.
/// Key validity is reported by `/check-openai/` instead.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "qdrant",
        Box::pin(async {
            state
                .store
                .health_check()
                .await
                .map_err(|e| format!("Qdrant health check failed: {}", e))
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
