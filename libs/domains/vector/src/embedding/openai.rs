use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_duration_secs, env_or_default, env_required};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingResult;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAIEmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl FromEnv for OpenAIEmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("OPENAI_API_KEY")?,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or_default("OPENAI_EMBEDDING_MODEL", DEFAULT_MODEL),
            timeout: env_duration_secs("OPENAI_TIMEOUT_SECS", 120)?,
        })
    }
}

/// OpenAI `/embeddings` client
pub struct OpenAIEmbeddings {
    client: Client,
    config: OpenAIEmbeddingConfig,
}

impl OpenAIEmbeddings {
    pub fn new(config: OpenAIEmbeddingConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn model_name(&self) -> String {
        self.config.model.clone()
    }

    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))
    }

    #[instrument(skip(self, texts), fields(model = %self.config.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = format!("OpenAI API error ({}): {}", status, error_text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    VectorError::InvalidCredential(message)
                }
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                    VectorError::Unavailable(message)
                }
                _ => VectorError::Embedding(message),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        let tokens_per_embedding = embedding_response
            .usage
            .map(|u| u.total_tokens / texts.len() as u32)
            .unwrap_or(0);

        Ok(data
            .into_iter()
            .map(|d| EmbeddingResult {
                dimension: d.embedding.len() as u32,
                values: d.embedding,
                tokens_used: tokens_per_embedding,
            })
            .collect())
    }
}
