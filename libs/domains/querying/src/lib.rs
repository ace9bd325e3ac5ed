//! Document Querying Domain Library
//!
//! Answers a question from the chunks of a Qdrant collection most similar to
//! it: embed, search, then ask the completion provider with the retrieved
//! text as context.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use core_config::FromEnv;
//! use domain_completion::{CompletionService, OpenAiClient, OpenAiConfig};
//! use domain_querying::{DocumentQuery, QueryService};
//! use domain_vector::{
//!     OpenAIEmbeddingConfig, OpenAIEmbeddings, QdrantConfig, QdrantStore, VectorService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embeddings = OpenAIEmbeddings::new(OpenAIEmbeddingConfig::from_env()?)?;
//! let vectors = VectorService::new(QdrantStore::new(QdrantConfig::from_env()?)?)
//!     .with_embedding_provider(Arc::new(embeddings));
//! let completions = CompletionService::new(OpenAiClient::new(OpenAiConfig::from_env()?)?);
//!
//! let service = QueryService::new(vectors, completions);
//! let answer = service
//!     .query(DocumentQuery::new("docs", "What is the refund policy?"))
//!     .await?;
//! println!("{}", answer.text());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::{QueryingError, QueryingResult};
pub use handlers::QueryingApiDoc;
pub use models::{
    DEFAULT_SIMILARITY_TOP_K, DocumentAnswer, DocumentQuery, NodeContent, QueryResponse,
    SourceNode,
};
pub use service::QueryService;
