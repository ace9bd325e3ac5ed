use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_completion::OpenAiConfig;
use domain_vector::{OpenAIEmbeddingConfig, QdrantConfig};

pub use core_config::Environment;

/// Backend configuration, composed from the per-domain `FromEnv` configs.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub qdrant: QdrantConfig,
    pub openai: OpenAiConfig,
    pub embeddings: OpenAIEmbeddingConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            qdrant: QdrantConfig::from_env()?,
            openai: OpenAiConfig::from_env()?,
            embeddings: OpenAIEmbeddingConfig::from_env()?,
        })
    }
}
