use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::EmbeddingResult;

/// Trait for embedding generation providers
///
/// The model is fixed by the implementation's configuration so that query
/// vectors match the vectors stored in the collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name of the embedding model, e.g. `text-embedding-3-small`
    fn model_name(&self) -> String;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts in batch, in input order
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>>;
}
