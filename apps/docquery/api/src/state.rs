//! Shared application state.
//!
//! Clients are built once at startup and shared by every router through
//! `Arc` clones; nothing in here is mutated after `main` hands it out.

use std::sync::Arc;

use domain_completion::OpenAiClient;
use domain_vector::{EmbeddingProvider, OpenAIEmbeddings, QdrantStore};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Qdrant gRPC client; connects lazily on the first call
    pub store: Arc<QdrantStore>,
    /// Chat-completions client used by the relay and the document query
    pub llm: Arc<OpenAiClient>,
    /// Question embeddings for the document query
    pub embeddings: Arc<dyn EmbeddingProvider>,
}

impl AppState {
    pub fn new(config: Config) -> eyre::Result<Self> {
        let store = QdrantStore::new(config.qdrant.clone())?;
        let llm = OpenAiClient::new(config.openai.clone())?;
        let embeddings = OpenAIEmbeddings::new(config.embeddings.clone())?;

        Ok(Self {
            config,
            store: Arc::new(store),
            llm: Arc::new(llm),
            embeddings: Arc::new(embeddings),
        })
    }
}
