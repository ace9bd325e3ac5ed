//! Service status endpoints: `/`, `/help/` and `/api-status/`.

use axum::{
    Json, Router,
    response::Redirect,
    routing::get,
};
use utoipa::OpenApi;

pub const HELP_TEXT: &str = "\
Document querying API

/help/                  this text
/api-status/            liveness, always true
/get-all-collections/   collections in the vector database
/get-infos-collection/  metadata for ?collection_name=
/collection-exists/     existence check for ?collection_name=
/check-openai/          whether the configured OpenAI key is usable
/openai-completion/     POST {user_prompt, system_prompt?, stream_response?, model?}
/available-llms/        models offered for document querying
/query-collection/      POST {collection_name, question, llm_model_name?, similarity_top_k?}
/swagger-ui             interactive API documentation
";

#[derive(OpenApi)]
#[openapi(
    paths(help, api_status),
    tags(
        (name = "status", description = "Service status")
    )
)]
pub struct StatusApiDoc;

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/help/", get(help))
        .route("/api-status/", get(api_status))
}

async fn home() -> Redirect {
    Redirect::temporary("/help/")
}

/// Plain-text endpoint overview
#[utoipa::path(
    get,
    path = "/help/",
    tag = "status",
    responses(
        (status = 200, description = "Endpoint overview", body = String, content_type = "text/plain")
    )
)]
pub async fn help() -> &'static str {
    HELP_TEXT
}

/// Liveness signal; a bare `true`, not an envelope
#[utoipa::path(
    get,
    path = "/api-status/",
    tag = "status",
    responses(
        (status = 200, description = "The service is up", body = bool)
    )
)]
pub async fn api_status() -> Json<bool> {
    Json(true)
}
