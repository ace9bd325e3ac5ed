//! In-memory collaborators for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain_completion::{
    Completion, CompletionError, CompletionProvider, CompletionRequest, CompletionResult,
    CompletionStream, Message,
};
use domain_vector::{
    CollectionInfo, EmbeddingProvider, EmbeddingResult, ScoredPoint, VectorError, VectorResult,
    VectorStore,
};

pub fn point(id: &str, score: f32, text: Option<&str>) -> ScoredPoint {
    ScoredPoint {
        id: id.to_string(),
        score,
        text: text.map(str::to_string),
        payload: text
            .map(|t| serde_json::json!({ "text": t }))
            .unwrap_or_else(|| serde_json::json!({})),
    }
}

pub type Searches = Arc<Mutex<Vec<(String, u64)>>>;

pub struct FakeStore {
    points: Option<Vec<ScoredPoint>>,
    searches: Searches,
}

impl FakeStore {
    pub fn with_points(points: Vec<ScoredPoint>) -> Self {
        Self {
            points: Some(points),
            searches: Searches::default(),
        }
    }

    /// A store where every collection is absent.
    pub fn missing() -> Self {
        Self {
            points: None,
            searches: Searches::default(),
        }
    }

    pub fn searches(&self) -> Searches {
        self.searches.clone()
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        Ok(self.points.iter().map(|_| "docs".to_string()).collect())
    }

    async fn collection_info(&self, collection_name: &str) -> VectorResult<CollectionInfo> {
        Err(VectorError::CollectionNotFound(collection_name.to_string()))
    }

    async fn collection_exists(&self, _collection_name: &str) -> VectorResult<bool> {
        Ok(self.points.is_some())
    }

    async fn search(
        &self,
        collection_name: &str,
        _vector: Vec<f32>,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>> {
        let points = self
            .points
            .as_ref()
            .ok_or_else(|| VectorError::CollectionNotFound(collection_name.to_string()))?;

        if let Ok(mut searches) = self.searches.lock() {
            searches.push((collection_name.to_string(), limit));
        }
        Ok(points.iter().take(limit as usize).cloned().collect())
    }

    async fn health_check(&self) -> VectorResult<()> {
        Ok(())
    }
}

pub struct FakeEmbeddings;

#[async_trait]
impl EmbeddingProvider for FakeEmbeddings {
    fn model_name(&self) -> String {
        "fake-embedding".to_string()
    }

    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult> {
        Ok(EmbeddingResult {
            values: vec![text.len() as f32; 4],
            dimension: 4,
            tokens_used: 1,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

pub type Prompts = Arc<Mutex<Vec<CompletionRequest>>>;

pub struct FakeCompletions {
    reply: String,
    prompts: Prompts,
}

impl FakeCompletions {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Prompts::default(),
        }
    }

    pub fn prompts(&self) -> Prompts {
        self.prompts.clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletions {
    fn default_model(&self) -> String {
        "gpt-4o-mini".to_string()
    }

    fn available_models(&self) -> Vec<String> {
        vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.clone());
        }
        Ok(Completion {
            message: Message::assistant(self.reply.clone()),
            finish_reason: Some("stop".to_string()),
            model: request.model.clone().unwrap_or_else(|| self.default_model()),
            usage: None,
        })
    }

    async fn stream(&self, _request: &CompletionRequest) -> CompletionResult<CompletionStream> {
        Err(CompletionError::Config("streaming is not scripted".to_string()))
    }

    async fn check_key(&self) -> bool {
        true
    }
}
