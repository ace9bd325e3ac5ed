//! HTTP client for the document-querying backend.
//!
//! Helpers without a prefix degrade to a neutral value (`false`, empty) when
//! anything goes wrong, so a front-end can render without error handling.
//! Their `try_*` twins return the underlying [`ChatError`].

use std::pin::Pin;
use std::time::Duration;

use axum_helpers::{ApiEnvelope, NoParams};
use domain_completion::{
    AvailableLlms, Completion, CompletionChunk, CompletionMode, CompletionRequest, SseDecoder,
};
use domain_querying::{DocumentAnswer, DocumentQuery};
use domain_vector::CollectionsList;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::{ChatConfig, DocumentQueryingUrls};
use crate::error::{ChatError, ChatResult};

/// Lazy sequence of text fragments from a streamed answer.
pub type TextStream = Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>>;

/// Answer to a plain question, shaped by the requested mode.
pub enum Answer {
    Full(String),
    Streamed(TextStream),
}

impl Answer {
    /// Wait for the whole text, whatever the mode.
    pub async fn into_text(self) -> ChatResult<String> {
        match self {
            Answer::Full(text) => Ok(text),
            Answer::Streamed(mut stream) => {
                let mut text = String::new();
                while let Some(fragment) = stream.next().await {
                    text.push_str(&fragment?);
                }
                Ok(text)
            }
        }
    }
}

impl std::fmt::Debug for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Full(text) => f.debug_tuple("Full").field(text).finish(),
            Answer::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// One retrieved chunk backing a document answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReference {
    pub text: String,
    pub score: f32,
}

/// A document answer with its references, best match first.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub answer: String,
    pub references: Vec<QueryReference>,
}

impl From<DocumentAnswer> for QueryAnswer {
    fn from(answer: DocumentAnswer) -> Self {
        let response = answer.response;
        Self {
            answer: response.response,
            references: response
                .source_nodes
                .into_iter()
                .map(|source| QueryReference {
                    text: source.node.text,
                    score: source.score,
                })
                .collect(),
        }
    }
}

pub struct QueryingClient {
    http: Client,
    urls: DocumentQueryingUrls,
    timeout: Duration,
    system_prompt: String,
}

impl QueryingClient {
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            urls: config.urls.clone(),
            timeout: config.timeout,
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn urls(&self) -> &DocumentQueryingUrls {
        &self.urls
    }

    pub async fn check_api_status(&self) -> bool {
        degrade("api status", self.try_check_api_status().await)
    }

    /// `GET /api-status/`, which answers a bare `true`.
    pub async fn try_check_api_status(&self) -> ChatResult<bool> {
        let response = self.send(self.http.get(self.urls.api_status())).await?;
        Ok(response.json::<bool>().await?)
    }

    pub async fn check_openai_key(&self) -> bool {
        degrade("openai key", self.try_check_openai_key().await)
    }

    pub async fn try_check_openai_key(&self) -> ChatResult<bool> {
        self.get_envelope(self.urls.check_openai_key()).await
    }

    pub async fn get_all_collections(&self) -> Vec<String> {
        degrade("collections", self.try_get_all_collections().await)
    }

    pub async fn try_get_all_collections(&self) -> ChatResult<Vec<String>> {
        let list: CollectionsList = self.get_envelope(self.urls.all_collections()).await?;
        Ok(list.collections.into_iter().map(|c| c.name).collect())
    }

    pub async fn get_available_llms(&self) -> AvailableLlms {
        degrade("available llms", self.try_get_available_llms().await)
    }

    pub async fn try_get_available_llms(&self) -> ChatResult<AvailableLlms> {
        self.get_envelope(self.urls.available_llms()).await
    }

    /// Ask the completion relay a question with the configured system prompt.
    #[instrument(skip(self, question), fields(mode = mode.as_str()))]
    pub async fn send_question(&self, question: &str, mode: CompletionMode) -> ChatResult<Answer> {
        let mut request =
            CompletionRequest::new(question).with_system_prompt(self.system_prompt.clone());
        if mode == CompletionMode::Streamed {
            request = request.streamed();
        }

        let builder = self.http.post(self.urls.openai_completion()).json(&request);

        match mode {
            CompletionMode::Batched => {
                let completion: Completion = self.envelope(builder).await?;
                Ok(Answer::Full(completion.message.content))
            }
            CompletionMode::Streamed => {
                let send = builder.send();
                let response = tokio::time::timeout(self.timeout, send)
                    .await
                    .map_err(|_| self.timed_out())??;
                let response = check_status(response).await?;
                Ok(Answer::Streamed(text_stream(response, self.timeout)))
            }
        }
    }

    /// Retrieval-augmented answer over one collection.
    #[instrument(skip(self, query), fields(collection = %query.collection_name))]
    pub async fn query_collection(&self, query: &DocumentQuery) -> ChatResult<QueryAnswer> {
        let builder = self.http.post(self.urls.query_collection()).json(query);
        let answer: DocumentAnswer = self.envelope(builder).await?;
        Ok(answer.into())
    }

    fn timed_out(&self) -> ChatError {
        ChatError::Unavailable(format!("no response within {}s", self.timeout.as_secs()))
    }

    async fn send(&self, builder: RequestBuilder) -> ChatResult<Response> {
        let response = builder.timeout(self.timeout).send().await?;
        check_status(response).await
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: String) -> ChatResult<T> {
        self.envelope(self.http.get(url)).await
    }

    /// Send, then unwrap `results` from a `{results, params, error}` body.
    async fn envelope<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ChatResult<T> {
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        let envelope: ApiEnvelope<T, NoParams> = response.json().await?;

        match envelope.results {
            Some(results) if envelope.error.is_empty() => Ok(results),
            _ => Err(ChatError::Api {
                status,
                message: envelope.error,
            }),
        }
    }
}

fn degrade<T: Default>(what: &str, result: ChatResult<T>) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Falling back to default for {}", what);
        T::default()
    })
}

/// Map a non-success status onto [`ChatError::Api`], keeping the envelope's message.
async fn check_status(response: Response) -> ChatResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiEnvelope<serde_json::Value, NoParams>>(&body)
        .map(|envelope| envelope.error)
        .unwrap_or(body);

    Err(ChatError::Api {
        status: status.as_u16(),
        message,
    })
}

fn text_stream(response: Response, idle: Duration) -> TextStream {
    let mut bytes = Box::pin(response.bytes_stream());

    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();

        loop {
            let next = match tokio::time::timeout(idle, bytes.next()).await {
                Ok(next) => next,
                Err(_) => {
                    yield Err(ChatError::Unavailable(format!(
                        "stream idle for more than {}s",
                        idle.as_secs()
                    )));
                    return;
                }
            };

            let (frames, closed) = match next {
                Some(Ok(chunk)) => (decoder.push(&chunk), false),
                Some(Err(e)) => {
                    yield Err(ChatError::Stream(e.to_string()));
                    return;
                }
                None => (decoder.finish().into_iter().collect(), true),
            };

            for frame in frames {
                if frame.is_done() {
                    return;
                }
                if frame.is_error() {
                    yield Err(ChatError::Stream(frame.data));
                    return;
                }
                match serde_json::from_str::<CompletionChunk>(&frame.data) {
                    Ok(chunk) => yield Ok(chunk.content),
                    Err(e) => {
                        yield Err(ChatError::InvalidResponse(e.to_string()));
                        return;
                    }
                }
            }

            if closed {
                return;
            }
        }
    })
}
