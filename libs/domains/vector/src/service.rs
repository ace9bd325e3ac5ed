use std::sync::Arc;

use observability::RelayMetrics;
use tracing::instrument;

use crate::embedding::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionInfo, ScoredPoint};
use crate::repository::VectorStore;

/// Vector service providing the collection operations exposed over HTTP
///
/// Wraps a [`VectorStore`] with input validation and metrics, and optionally
/// an [`EmbeddingProvider`] for text search.
pub struct VectorService<S: VectorStore> {
    store: S,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl<S: VectorStore> VectorService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            embedding_provider: None,
        }
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    #[instrument(skip(self))]
    pub async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let result = self.store.list_collections().await;
        observe("list_collections", &result);
        result
    }

    #[instrument(skip(self))]
    pub async fn collection_info(&self, collection_name: &str) -> VectorResult<CollectionInfo> {
        validate_collection_name(collection_name)?;
        let result = self.store.collection_info(collection_name).await;
        observe("collection_info", &result);
        result
    }

    #[instrument(skip(self))]
    pub async fn collection_exists(&self, collection_name: &str) -> VectorResult<bool> {
        validate_collection_name(collection_name)?;
        let result = self.store.collection_exists(collection_name).await;
        observe("collection_exists", &result);
        result
    }

    #[instrument(skip(self, vector))]
    pub async fn search(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>> {
        validate_collection_name(collection_name)?;
        if limit == 0 {
            return Err(VectorError::Validation(
                "limit must be at least 1".to_string(),
            ));
        }

        let result = self.store.search(collection_name, vector, limit).await;
        observe("search", &result);
        result
    }

    /// Embed `text` with the configured provider, then search.
    #[instrument(skip(self, text))]
    pub async fn search_text(
        &self,
        collection_name: &str,
        text: &str,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>> {
        let provider = self
            .embedding_provider
            .as_ref()
            .ok_or_else(|| VectorError::Config("No embedding provider configured".to_string()))?;

        let embedding = provider.embed(text).await.inspect_err(|e| {
            RelayMetrics::record_upstream_error("openai", e.kind());
        })?;

        self.search(collection_name, embedding.values, limit).await
    }

    pub async fn health_check(&self) -> VectorResult<()> {
        self.store.health_check().await
    }
}

fn validate_collection_name(collection_name: &str) -> VectorResult<()> {
    if collection_name.trim().is_empty() {
        return Err(VectorError::Validation(
            "collection_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn observe<T>(operation: &'static str, result: &VectorResult<T>) {
    RelayMetrics::record_vector_operation(operation, result.is_ok());

    if let Err(err) = result {
        match err {
            VectorError::CollectionNotFound(_) | VectorError::Validation(_) => {}
            _ => RelayMetrics::record_upstream_error("qdrant", err.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{CollectionStatus, EmbeddingResult};
    use crate::repository::MockVectorStore;

    fn info(name: &str) -> CollectionInfo {
        CollectionInfo {
            name: name.to_string(),
            status: CollectionStatus::Green,
            points_count: Some(12),
            segments_count: 2,
            vector_size: Some(1536),
            distance: Some("Cosine".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_collections_passes_through() {
        let mut store = MockVectorStore::new();
        store
            .expect_list_collections()
            .times(1)
            .returning(|| Ok(vec!["docs".to_string(), "faq".to_string()]));

        let service = VectorService::new(store);
        assert_eq!(service.list_collections().await.unwrap(), vec!["docs", "faq"]);
    }

    #[tokio::test]
    async fn test_collection_exists_for_present_and_absent_names() {
        let mut store = MockVectorStore::new();
        store
            .expect_collection_exists()
            .withf(|name| name == "docs")
            .returning(|_| Ok(true));
        store
            .expect_collection_exists()
            .withf(|name| name == "missing")
            .returning(|_| Ok(false));

        let service = VectorService::new(store);
        assert!(service.collection_exists("docs").await.unwrap());
        assert!(!service.collection_exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_name_never_reaches_store() {
        let mut store = MockVectorStore::new();
        store.expect_collection_info().never();
        store.expect_collection_exists().never();

        let service = VectorService::new(store);
        assert!(matches!(
            service.collection_info("  ").await,
            Err(VectorError::Validation(_))
        ));
        assert!(matches!(
            service.collection_exists("").await,
            Err(VectorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_collection_info_not_found() {
        let mut store = MockVectorStore::new();
        store
            .expect_collection_info()
            .returning(|name| Err(VectorError::CollectionNotFound(name.to_string())));

        let service = VectorService::new(store);
        let err = service.collection_info("missing").await.unwrap_err();
        assert!(matches!(err, VectorError::CollectionNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_collection_info_returns_metadata() {
        let mut store = MockVectorStore::new();
        store
            .expect_collection_info()
            .withf(|name| name == "docs")
            .returning(|name| Ok(info(name)));

        let service = VectorService::new(store);
        let result = service.collection_info("docs").await.unwrap();
        assert_eq!(result.vector_size, Some(1536));
    }

    #[tokio::test]
    async fn test_search_rejects_zero_limit() {
        let mut store = MockVectorStore::new();
        store.expect_search().never();

        let service = VectorService::new(store);
        assert!(service.search("docs", vec![0.1], 0).await.is_err());
    }

    #[tokio::test]
    async fn test_search_text_embeds_then_searches() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .withf(|text| text == "What is the refund policy?")
            .times(1)
            .returning(|_| {
                Ok(EmbeddingResult {
                    values: vec![0.5, 0.5],
                    dimension: 2,
                    tokens_used: 6,
                })
            });

        let mut store = MockVectorStore::new();
        store
            .expect_search()
            .withf(|name, vector, limit| name == "docs" && vector == &[0.5, 0.5] && *limit == 4)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![ScoredPoint {
                    id: "1".to_string(),
                    score: 0.91,
                    text: Some("Refunds within 30 days".to_string()),
                    payload: serde_json::json!({"text": "Refunds within 30 days"}),
                }])
            });

        let service = VectorService::new(store).with_embedding_provider(Arc::new(provider));
        let hits = service
            .search_text("docs", "What is the refund policy?", 4)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text.as_deref(), Some("Refunds within 30 days"));
    }

    #[tokio::test]
    async fn test_search_text_without_provider_is_config_error() {
        let service = VectorService::new(MockVectorStore::new());
        assert!(matches!(
            service.search_text("docs", "q", 4).await,
            Err(VectorError::Config(_))
        ));
    }
}
