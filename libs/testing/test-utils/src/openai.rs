//! An OpenAI-compatible upstream for exercising real HTTP clients.
//!
//! Serves under `/v1`:
//! - `POST /chat/completions` (JSON or `text/event-stream` when `"stream": true`)
//! - `GET /models`
//! - `POST /embeddings`
//!
//! Every route requires `Authorization: Bearer <api key>` and answers 401
//! with an OpenAI-style error body otherwise.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::server::TestServer;

/// The key the fake upstream accepts unless overridden.
pub const TEST_API_KEY: &str = "sk-test-key";

const DEFAULT_CHUNKS: [&str; 4] = [
    "Refunds are accepted ",
    "within 30 days ",
    "of purchase",
    ".",
];

/// Scripted behaviour for the fake upstream.
#[derive(Debug, Clone)]
pub struct FakeOpenAi {
    api_key: String,
    chunks: Vec<String>,
    models: Vec<String>,
    send_done: bool,
    chunk_delay: Duration,
    reply_delay: Duration,
    fail_after: Option<usize>,
    error_status: Option<StatusCode>,
    embedding_dimension: usize,
}

impl Default for FakeOpenAi {
    fn default() -> Self {
        Self {
            api_key: TEST_API_KEY.to_string(),
            chunks: DEFAULT_CHUNKS.iter().map(|c| c.to_string()).collect(),
            models: vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()],
            send_done: true,
            chunk_delay: Duration::ZERO,
            reply_delay: Duration::ZERO,
            fail_after: None,
            error_status: None,
            embedding_dimension: 8,
        }
    }
}

impl FakeOpenAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Content fragments, streamed one per SSE frame; the batched reply is their concatenation.
    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Close the stream without the `data: [DONE]` marker.
    pub fn without_done_marker(mut self) -> Self {
        self.send_done = false;
        self
    }

    /// Sleep before every content frame.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Hold the batched reply for `delay` before the headers and again before the body.
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Abort the connection after `n` content frames.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Answer every chat completion with this status and an error body.
    pub fn with_error_status(mut self, status: StatusCode) -> Self {
        self.error_status = Some(status);
        self
    }

    pub fn with_embedding_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = dimension;
        self
    }

    /// The batched reply text.
    pub fn reply(&self) -> String {
        self.chunks.concat()
    }

    pub fn router(self) -> (Router, Arc<Mutex<Vec<Value>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(FakeState {
            script: self,
            requests: requests.clone(),
        });

        let v1 = Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/models", get(list_models))
            .route("/embeddings", post(embeddings))
            .with_state(state);

        (Router::new().nest("/v1", v1), requests)
    }

    pub async fn spawn(self) -> FakeOpenAiServer {
        let reply = self.reply();
        let (router, requests) = self.router();
        FakeOpenAiServer {
            server: TestServer::spawn(router).await,
            requests,
            reply,
        }
    }
}

/// A running [`FakeOpenAi`].
pub struct FakeOpenAiServer {
    server: TestServer,
    requests: Arc<Mutex<Vec<Value>>>,
    reply: String,
}

impl FakeOpenAiServer {
    /// Base URL in the form clients expect, ending in `/v1`.
    pub fn base_url(&self) -> String {
        self.server.url_for("/v1")
    }

    /// The batched reply text.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Bodies of every chat completion request received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

struct FakeState {
    script: FakeOpenAi,
    requests: Arc<Mutex<Vec<Value>>>,
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.script.api_key);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {"message": message, "type": "invalid_request_error", "code": code}
        })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "Incorrect API key provided",
        "invalid_api_key",
    )
}

async fn chat_completions(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(body.clone());
    }
    if let Some(status) = state.script.error_status {
        return error_response(status, "The server had an error", "server_error");
    }

    let model = body["model"].as_str().unwrap_or("gpt-4o-mini").to_string();

    if body["stream"].as_bool().unwrap_or(false) {
        stream_completion(state, model)
    } else {
        batched_completion(state, model).await
    }
}

async fn batched_completion(state: Arc<FakeState>, model: String) -> Response {
    let script = &state.script;
    let completion_tokens = script.chunks.len();
    let body = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 0,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": script.reply()},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 12,
            "completion_tokens": completion_tokens,
            "total_tokens": 12 + completion_tokens
        }
    });

    let delay = script.reply_delay;
    if delay.is_zero() {
        return Json(body).into_response();
    }

    tokio::time::sleep(delay).await;
    let stream = async_stream::stream! {
        tokio::time::sleep(delay).await;
        yield Ok::<_, std::io::Error>(body.to_string());
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn chunk_frame(model: &str, delta: Value, finish_reason: Value) -> String {
    let payload = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 0,
        "model": model,
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    });
    format!("data: {}\n\n", payload)
}

fn stream_completion(state: Arc<FakeState>, model: String) -> Response {
    let stream = async_stream::stream! {
        let script = &state.script;

        yield Ok::<_, std::io::Error>(chunk_frame(
            &model,
            json!({"role": "assistant", "content": ""}),
            Value::Null,
        ));

        for (i, chunk) in script.chunks.iter().enumerate() {
            if script.fail_after == Some(i) {
                yield Err(std::io::Error::other("upstream connection reset"));
                return;
            }
            if !script.chunk_delay.is_zero() {
                tokio::time::sleep(script.chunk_delay).await;
            }

            // Frames go out in two writes so clients must reassemble them.
            let frame = chunk_frame(&model, json!({"content": chunk}), Value::Null);
            let mut split = frame.len() / 2;
            while !frame.is_char_boundary(split) {
                split += 1;
            }
            yield Ok(frame[..split].to_string());
            tokio::task::yield_now().await;
            yield Ok(frame[split..].to_string());
        }

        yield Ok(chunk_frame(&model, json!({}), json!("stop")));

        if script.send_done {
            yield Ok("data: [DONE]\n\n".to_string());
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn list_models(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let data: Vec<Value> = state
        .script
        .models
        .iter()
        .map(|id| json!({"id": id, "object": "model", "created": 0, "owned_by": "openai"}))
        .collect();

    Json(json!({"object": "list", "data": data})).into_response()
}

/// Deterministic embedding: depends only on the text length and position.
fn fake_embedding(text: &str, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|j| ((text.len() + j) % 7) as f32 / 7.0)
        .collect()
}

async fn embeddings(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let inputs: Vec<String> = match &body["input"] {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "'input' is a required property",
                "invalid_input",
            );
        }
    };

    let data: Vec<Value> = inputs
        .iter()
        .enumerate()
        .map(|(index, text)| {
            json!({
                "object": "embedding",
                "index": index,
                "embedding": fake_embedding(text, state.script.embedding_dimension)
            })
        })
        .collect();

    Json(json!({
        "object": "list",
        "data": data,
        "model": body["model"],
        "usage": {"prompt_tokens": inputs.len(), "total_tokens": inputs.len()}
    }))
    .into_response()
}
