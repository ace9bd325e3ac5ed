use domain_completion::{
    CompletionOutput, CompletionProvider, CompletionRequest, CompletionService,
};
use domain_vector::{ScoredPoint, VectorService, VectorStore};
use tracing::instrument;
use validator::Validate;

use crate::error::{QueryingError, QueryingResult};
use crate::models::{DocumentAnswer, DocumentQuery, NodeContent, SourceNode};
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, EMPTY_RESPONSE, grounded_prompt};

/// Retrieval-augmented answers over one Qdrant collection.
///
/// The question is embedded and searched by the [`VectorService`]; the
/// best-scoring chunks become the context of a batched completion.
pub struct QueryService<S: VectorStore, P: CompletionProvider> {
    vectors: VectorService<S>,
    completions: CompletionService<P>,
    system_prompt: String,
}

impl<S: VectorStore, P: CompletionProvider> QueryService<S, P> {
    /// `vectors` must have an embedding provider configured.
    pub fn new(vectors: VectorService<S>, completions: CompletionService<P>) -> Self {
        Self {
            vectors,
            completions,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    #[instrument(skip(self, query), fields(collection = %query.collection_name, top_k = query.similarity_top_k))]
    pub async fn query(&self, query: DocumentQuery) -> QueryingResult<DocumentAnswer> {
        query.validate()?;

        let points = self
            .vectors
            .search_text(&query.collection_name, &query.question, query.similarity_top_k)
            .await?;
        let source_nodes = source_nodes(points);

        if source_nodes.is_empty() {
            tracing::info!("No context retrieved; skipping completion");
            return Ok(DocumentAnswer::new(EMPTY_RESPONSE, source_nodes));
        }

        let mut request = CompletionRequest::new(grounded_prompt(&query.question, &source_nodes))
            .with_system_prompt(self.system_prompt.clone());
        if let Some(model) = query.llm_model_name {
            request = request.with_model(model);
        }

        match self.completions.complete(request).await? {
            CompletionOutput::Batched(completion) => {
                tracing::info!(sources = source_nodes.len(), "Answered document query");
                Ok(DocumentAnswer::new(completion.message.content, source_nodes))
            }
            CompletionOutput::Streamed(_) => Err(QueryingError::Internal(
                "batched completion answered with a stream".to_string(),
            )),
        }
    }
}

/// Keep points that carry text, preserving the store's rank order.
fn source_nodes(points: Vec<ScoredPoint>) -> Vec<SourceNode> {
    points
        .into_iter()
        .filter_map(|point| {
            let text = point.text?;
            Some(SourceNode {
                node: NodeContent { id: point.id, text },
                score: point.score,
            })
        })
        .collect()
}
