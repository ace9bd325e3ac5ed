//! HTTP handlers for collection discovery and metadata.
//!
//! Every handler answers with the `{results, params, error}` envelope.

use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::{ApiEnvelope, NoParams, ValidatedQuery, respond};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    CollectionInfo, CollectionQuery, CollectionStatus, CollectionSummary, CollectionsList,
};
use crate::repository::VectorStore;
use crate::service::VectorService;

/// OpenAPI documentation for the collection endpoints
#[derive(OpenApi)]
#[openapi(
    paths(get_all_collections, get_infos_collection, collection_exists),
    components(schemas(
        CollectionInfo,
        CollectionQuery,
        CollectionStatus,
        CollectionSummary,
        CollectionsList
    )),
    tags(
        (name = "collections", description = "Qdrant collection discovery")
    )
)]
pub struct VectorApiDoc;

/// Create router for the collection endpoints
pub fn router<S: VectorStore + 'static>(service: VectorService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/get-all-collections/", get(get_all_collections::<S>))
        .route("/get-infos-collection/", get(get_infos_collection::<S>))
        .route("/collection-exists/", get(collection_exists::<S>))
        .with_state(shared_service)
}

/// List every collection in the vector database
#[utoipa::path(
    get,
    path = "/get-all-collections/",
    tag = "collections",
    responses(
        (status = 200, description = "Collection names", body = ApiEnvelope<CollectionsList, NoParams>),
        (status = 503, description = "Vector database unreachable", body = ApiEnvelope<CollectionsList, NoParams>)
    )
)]
pub async fn get_all_collections<S: VectorStore>(
    State(service): State<Arc<VectorService<S>>>,
) -> Response {
    let result = service
        .list_collections()
        .await
        .map(CollectionsList::from);
    respond(NoParams, result)
}

/// Collection metadata
#[utoipa::path(
    get,
    path = "/get-infos-collection/",
    tag = "collections",
    params(
        ("collection_name" = String, Query, description = "Collection name")
    ),
    responses(
        (status = 200, description = "Collection metadata", body = ApiEnvelope<CollectionInfo, CollectionQuery>),
        (status = 400, description = "Missing or empty collection name"),
        (status = 404, description = "Collection not found", body = ApiEnvelope<CollectionInfo, CollectionQuery>),
        (status = 503, description = "Vector database unreachable")
    )
)]
pub async fn get_infos_collection<S: VectorStore>(
    State(service): State<Arc<VectorService<S>>>,
    ValidatedQuery(params): ValidatedQuery<CollectionQuery>,
) -> Response {
    let result = service.collection_info(&params.collection_name).await;
    respond(params, result)
}

/// Whether a collection exists
#[utoipa::path(
    get,
    path = "/collection-exists/",
    tag = "collections",
    params(
        ("collection_name" = String, Query, description = "Collection name")
    ),
    responses(
        (status = 200, description = "Existence flag", body = ApiEnvelope<bool, CollectionQuery>),
        (status = 400, description = "Missing or empty collection name"),
        (status = 503, description = "Vector database unreachable")
    )
)]
pub async fn collection_exists<S: VectorStore>(
    State(service): State<Arc<VectorService<S>>>,
    ValidatedQuery(params): ValidatedQuery<CollectionQuery>,
) -> Response {
    let result = service.collection_exists(&params.collection_name).await;
    respond(params, result)
}
