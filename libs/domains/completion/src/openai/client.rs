use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::OpenAiConfig;
use crate::error::{CompletionError, CompletionResult};
use crate::models::{
    Completion, CompletionChunk, CompletionEvent, CompletionRequest, CompletionStream, Message,
    Role, Usage,
};
use crate::provider::CompletionProvider;
use crate::sse::{SseDecoder, SseFrame};

/// OpenAI `/chat/completions` client
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> CompletionResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn chat_body<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage {
                role: Role::System,
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: Role::User,
            content: &request.user_prompt,
        });

        ChatRequest {
            model: request.model.as_deref().unwrap_or(&self.config.model),
            messages,
            stream,
        }
    }

    async fn post_chat(&self, body: &ChatRequest<'_>) -> CompletionResult<Response> {
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        check_status(response).await
    }

    /// Send a chat request and wait at most `timeout` for the response headers.
    async fn send_chat(&self, body: &ChatRequest<'_>) -> CompletionResult<Response> {
        tokio::time::timeout(self.config.timeout, self.post_chat(body))
            .await
            .map_err(|_| {
                CompletionError::Unavailable(format!(
                    "no response within {}s",
                    self.config.timeout.as_secs()
                ))
            })?
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turn a non-success status into the matching error, keeping the provider's message.
async fn check_status(response: Response) -> CompletionResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(classify_status(status, message))
}

fn classify_status(status: StatusCode, message: String) -> CompletionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::InvalidCredential(message)
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => CompletionError::Unavailable(message),
        _ => CompletionError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract the content fragment carried by one stream frame, if any.
fn parse_frame(frame: &SseFrame) -> CompletionResult<Option<String>> {
    if frame.is_error() {
        return Err(CompletionError::Interrupted(frame.data.clone()));
    }

    let payload: StreamPayload = serde_json::from_str(&frame.data)?;
    if let Some(error) = payload.error {
        return Err(CompletionError::Rejected {
            status: StatusCode::OK.as_u16(),
            message: error.message,
        });
    }

    Ok(payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

fn idle_error(idle: Duration) -> CompletionError {
    CompletionError::Unavailable(format!("stream idle for more than {}s", idle.as_secs()))
}

fn batched_timeout_error(timeout: Duration) -> CompletionError {
    CompletionError::Unavailable(format!(
        "no complete response within {}s",
        timeout.as_secs()
    ))
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn default_model(&self) -> String {
        self.config.model.clone()
    }

    fn available_models(&self) -> Vec<String> {
        self.config.available_models.clone()
    }

    #[instrument(skip(self, request), fields(model = request.model.as_deref().unwrap_or(&self.config.model)))]
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        let body = self.chat_body(request, false);
        let exchange = async {
            let response = self.post_chat(&body).await?;
            Ok::<_, CompletionError>(response.bytes().await?)
        };

        let bytes = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| batched_timeout_error(self.config.timeout))??;
        let chat: ChatResponse = serde_json::from_slice(&bytes)?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("response has no choices".into()))?;

        Ok(Completion {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            finish_reason: choice.finish_reason,
            model: chat.model,
            usage: chat.usage,
        })
    }

    #[instrument(skip(self, request), fields(model = request.model.as_deref().unwrap_or(&self.config.model)))]
    async fn stream(&self, request: &CompletionRequest) -> CompletionResult<CompletionStream> {
        let response = self.send_chat(&self.chat_body(request, true)).await?;
        let mut bytes = Box::pin(response.bytes_stream());
        let idle = self.config.stream_idle_timeout;

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut index = 0usize;

            loop {
                let next = match tokio::time::timeout(idle, bytes.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        yield Err(idle_error(idle));
                        return;
                    }
                };

                let (frames, closed) = match next {
                    Some(Ok(chunk)) => (decoder.push(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(CompletionError::from_stream_error(e));
                        return;
                    }
                    None => (decoder.finish().into_iter().collect(), true),
                };

                for frame in frames {
                    if frame.is_done() {
                        yield Ok(CompletionEvent::Done);
                        return;
                    }
                    match parse_frame(&frame) {
                        Ok(Some(content)) => {
                            yield Ok(CompletionEvent::Delta(CompletionChunk { index, content }));
                            index += 1;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                if closed {
                    tracing::debug!(chunks = index, "Upstream closed the stream without a done marker");
                    return;
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn check_key(&self) -> bool {
        let request = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .send();

        match request.await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "OpenAI key check rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI key check failed");
                false
            }
        }
    }
}
