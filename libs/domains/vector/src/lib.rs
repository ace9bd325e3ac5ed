//! Vector Domain Library
//!
//! Read-only access to the Qdrant vector database plus query embeddings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  VectorService  │  ← validation, metrics, text search
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │   VectorStore   │     │ EmbeddingProvider│
//! │    (trait)      │     │     (trait)      │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//! ┌────────▼────────┐     ┌────────▼─────────┐
//! │   QdrantStore   │     │ OpenAIEmbeddings │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{QdrantConfig, QdrantStore, VectorService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = QdrantStore::new(QdrantConfig::from_env()?)?;
//! let service = VectorService::new(store);
//!
//! for name in service.list_collections().await? {
//!     println!("{name}: {}", service.collection_exists(&name).await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;

pub use embedding::{EmbeddingProvider, OpenAIEmbeddingConfig, OpenAIEmbeddings};
pub use error::{VectorError, VectorResult};
pub use handlers::VectorApiDoc;
pub use models::{
    CollectionInfo, CollectionQuery, CollectionStatus, CollectionSummary, CollectionsList,
    EmbeddingResult, ScoredPoint, payload_text,
};
pub use qdrant::{QdrantConfig, QdrantStore};
pub use repository::VectorStore;
pub use service::VectorService;
