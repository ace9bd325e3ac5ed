use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_duration_secs, env_or_default, env_required};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat-completion configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Offered by `/available-llms/`; always contains `model`.
    pub available_models: Vec<String>,
    /// Whole-request deadline for batched calls and for receiving stream headers.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two reads of a stream.
    pub stream_idle_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            available_models: vec![DEFAULT_MODEL.to_string()],
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            stream_idle_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.available_models = with_default_first(&self.model, &self.available_models);
        self
    }

    pub fn with_available_models(mut self, models: Vec<String>) -> Self {
        self.available_models = with_default_first(&self.model, &models);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }
}

fn with_default_first(default: &str, models: &[String]) -> Vec<String> {
    let mut list = vec![default.to_string()];
    list.extend(models.iter().filter(|m| m.as_str() != default).cloned());
    list
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl FromEnv for OpenAiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "OPENAI_API_KEY".to_string(),
                details: "must not be empty".to_string(),
            });
        }

        let model = env_or_default("OPENAI_MODEL", DEFAULT_MODEL);
        let available = parse_model_list(&env_or_default("OPENAI_AVAILABLE_MODELS", ""));

        Ok(Self {
            api_key,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            available_models: with_default_first(&model, &available),
            model,
            timeout: env_duration_secs("OPENAI_TIMEOUT_SECS", 120)?,
            connect_timeout: env_duration_secs("OPENAI_CONNECT_TIMEOUT_SECS", 10)?,
            stream_idle_timeout: env_duration_secs("OPENAI_STREAM_IDLE_TIMEOUT_SECS", 60)?,
        })
    }
}
