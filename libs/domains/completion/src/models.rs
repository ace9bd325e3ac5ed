use std::borrow::Cow;
use std::collections::BTreeMap;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::CompletionResult;

/// Body of `POST /openai-completion/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompletionRequest {
    #[validate(custom(function = "not_blank"))]
    pub user_prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// `true` for a `text/event-stream` of chunks, `false` for one envelope.
    #[serde(default)]
    pub stream_response: bool,
    /// Overrides the configured default model.
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub model: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

impl CompletionRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            system_prompt: None,
            stream_response: false,
            model: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn streamed(mut self) -> Self {
        self.stream_response = true;
        self
    }

    pub fn mode(&self) -> CompletionMode {
        if self.stream_response {
            CompletionMode::Streamed
        } else {
            CompletionMode::Batched
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Batched,
    Streamed,
}

impl CompletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMode::Batched => "batched",
            CompletionMode::Streamed => "streamed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A finished, batched completion. Front-ends read `message.content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Completion {
    pub message: Message,
    pub finish_reason: Option<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One fragment of generated text; `index` is its 0-based arrival position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletionChunk {
    pub index: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    Delta(CompletionChunk),
    /// Upstream sent its end-of-stream marker. Never synthesized.
    Done,
}

/// Lazy, finite, single-use sequence of completion events.
pub type CompletionStream = Pin<Box<dyn Stream<Item = CompletionResult<CompletionEvent>> + Send>>;

/// Result of [`crate::CompletionService::complete`], shaped by the request mode.
pub enum CompletionOutput {
    Batched(Completion),
    Streamed(CompletionStream),
}

impl std::fmt::Debug for CompletionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionOutput::Batched(c) => f.debug_tuple("Batched").field(c).finish(),
            CompletionOutput::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// A model the front-end may pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LlmInfo {
    pub model_name: String,
    pub provider: String,
    pub is_default: bool,
}

/// `results` of `/available-llms/`, keyed by model name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AvailableLlms(pub BTreeMap<String, LlmInfo>);

impl AvailableLlms {
    pub fn get(&self, model_name: &str) -> Option<&LlmInfo> {
        self.0.get(model_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The model marked as default, if any.
    pub fn default_model(&self) -> Option<&LlmInfo> {
        self.0.values().find(|info| info.is_default)
    }
}

impl FromIterator<LlmInfo> for AvailableLlms {
    fn from_iter<I: IntoIterator<Item = LlmInfo>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|info| (info.model_name.clone(), info))
                .collect(),
        )
    }
}
