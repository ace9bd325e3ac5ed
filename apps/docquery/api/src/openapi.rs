//! OpenAPI documentation configuration

use domain_completion::CompletionApiDoc;
use domain_querying::QueryingApiDoc;
use domain_vector::VectorApiDoc;
use utoipa::OpenApi;

use crate::api::status::StatusApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Querying API",
        version = "0.1.0",
        description = "Qdrant collections, OpenAI completions (batched or streamed) and grounded document queries",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    )
)]
struct ServiceDoc;

/// Combined documentation for every router mounted by `api::routes`.
///
/// Domain routes sit at the root rather than under a prefix, so the domain
/// documents are merged instead of nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(StatusApiDoc::openapi());
        doc.merge(VectorApiDoc::openapi());
        doc.merge(CompletionApiDoc::openapi());
        doc.merge(QueryingApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_public_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/help/",
            "/api-status/",
            "/get-all-collections/",
            "/get-infos-collection/",
            "/collection-exists/",
            "/check-openai/",
            "/openai-completion/",
            "/available-llms/",
            "/query-collection/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert_eq!(doc.info.title, "Document Querying API");
    }
}
