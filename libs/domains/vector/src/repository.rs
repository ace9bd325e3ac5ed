use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{CollectionInfo, ScoredPoint};

/// Read-only access to the vector database.
///
/// This trait abstracts the underlying store (Qdrant) so handlers and the
/// document query can be exercised without a running server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of every collection known to the store.
    async fn list_collections(&self) -> VectorResult<Vec<String>>;

    /// Metadata for one collection; `CollectionNotFound` if it is absent.
    async fn collection_info(&self, collection_name: &str) -> VectorResult<CollectionInfo>;

    async fn collection_exists(&self, collection_name: &str) -> VectorResult<bool>;

    /// The `limit` nearest points to `vector`, best first.
    async fn search(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>>;

    async fn health_check(&self) -> VectorResult<()>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for std::sync::Arc<T> {
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        (**self).list_collections().await
    }

    async fn collection_info(&self, collection_name: &str) -> VectorResult<CollectionInfo> {
        (**self).collection_info(collection_name).await
    }

    async fn collection_exists(&self, collection_name: &str) -> VectorResult<bool> {
        (**self).collection_exists(collection_name).await
    }

    async fn search(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>> {
        (**self).search(collection_name, vector, limit).await
    }

    async fn health_check(&self) -> VectorResult<()> {
        (**self).health_check().await
    }
}
