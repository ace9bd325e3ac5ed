use std::sync::Arc;

use axum::{Router, extract::State, response::Response, routing::post};
use axum_helpers::{ApiEnvelope, ValidatedJson, respond};
use domain_completion::CompletionProvider;
use domain_vector::VectorStore;
use utoipa::OpenApi;

use crate::models::{DocumentAnswer, DocumentQuery, NodeContent, QueryResponse, SourceNode};
use crate::service::QueryService;

/// OpenAPI documentation for the document query endpoint
#[derive(OpenApi)]
#[openapi(
    paths(query_collection),
    components(schemas(DocumentAnswer, DocumentQuery, NodeContent, QueryResponse, SourceNode)),
    tags(
        (name = "querying", description = "Answers grounded on a document collection")
    )
)]
pub struct QueryingApiDoc;

/// Create router for the document query endpoint
pub fn router<S, P>(service: QueryService<S, P>) -> Router
where
    S: VectorStore + 'static,
    P: CompletionProvider + 'static,
{
    Router::new()
        .route("/query-collection/", post(query_collection::<S, P>))
        .with_state(Arc::new(service))
}

/// Answer a question from the most similar chunks of a collection
#[utoipa::path(
    post,
    path = "/query-collection/",
    tag = "querying",
    request_body = DocumentQuery,
    responses(
        (status = 200, description = "Answer and the chunks it is grounded on", body = ApiEnvelope<DocumentAnswer, DocumentQuery>),
        (status = 400, description = "Empty field or similarity_top_k out of range"),
        (status = 404, description = "Collection not found"),
        (status = 503, description = "Vector database or model provider unreachable")
    )
)]
pub async fn query_collection<S, P>(
    State(service): State<Arc<QueryService<S, P>>>,
    ValidatedJson(query): ValidatedJson<DocumentQuery>,
) -> Response
where
    S: VectorStore,
    P: CompletionProvider,
{
    let params = query.clone();
    respond(params, service.query(query).await)
}
