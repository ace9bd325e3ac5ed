use core_config::{ConfigError, FromEnv, env_duration_secs, env_or_default};
use std::time::Duration;

const DEFAULT_URL: &str = "http://localhost:6334";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// gRPC endpoint, e.g. `http://localhost:6334`
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            url: env_or_default("QDRANT_URL", DEFAULT_URL),
            api_key,
            timeout: env_duration_secs("QDRANT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
