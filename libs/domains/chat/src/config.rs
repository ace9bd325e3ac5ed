use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_duration_secs, env_or_default};

const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an assistant helping a client with questions about their documents.";

pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// Endpoint URLs of the document-querying backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQueryingUrls {
    base_url: String,
}

impl DocumentQueryingUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn api_status(&self) -> String {
        self.endpoint("/api-status/")
    }

    pub fn check_openai_key(&self) -> String {
        self.endpoint("/check-openai/")
    }

    pub fn all_collections(&self) -> String {
        self.endpoint("/get-all-collections/")
    }

    pub fn available_llms(&self) -> String {
        self.endpoint("/available-llms/")
    }

    pub fn openai_completion(&self) -> String {
        self.endpoint("/openai-completion/")
    }

    pub fn query_collection(&self) -> String {
        self.endpoint("/query-collection/")
    }
}

/// Front-end configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub urls: DocumentQueryingUrls,
    /// Deadline for a whole JSON call, and the longest silence within a stream.
    pub timeout: Duration,
    pub system_prompt: String,
    /// First assistant entry of every transcript.
    pub greeting: String,
}

impl ChatConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            urls: DocumentQueryingUrls::new(api_url),
            timeout: Duration::from_secs(120),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl FromEnv for ChatConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            urls: DocumentQueryingUrls::new(env_or_default(
                "DOCUMENT_QUERYING_API_URL",
                DEFAULT_API_URL,
            )),
            timeout: env_duration_secs("DOCUMENT_QUERYING_TIMEOUT_SECS", 120)?,
            system_prompt: env_or_default("CHAT_SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            greeting: env_or_default("CHAT_GREETING", DEFAULT_GREETING),
        })
    }
}
