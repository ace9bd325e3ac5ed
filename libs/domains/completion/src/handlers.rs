//! HTTP handlers for the completion relay.
//!
//! `/openai-completion/` answers with the `{results, params, error}` envelope
//! for batched requests and with `text/event-stream` for streamed ones:
//!
//! ```text
//! data: {"index":0,"content":"Refunds are "}
//!
//! data: {"index":1,"content":"accepted."}
//!
//! data: [DONE]
//! ```
//!
//! A failure after the stream has started is sent as `event: error` and
//! closes the stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use axum_helpers::{ApiEnvelope, AppError, NoParams, ValidatedJson, respond};
use futures::{Stream, StreamExt};
use utoipa::OpenApi;

use crate::models::{
    AvailableLlms, Completion, CompletionChunk, CompletionEvent, CompletionOutput, CompletionRequest,
    CompletionStream, LlmInfo, Message, Role, Usage,
};
use crate::provider::CompletionProvider;
use crate::service::CompletionService;
use crate::sse::DONE_MARKER;

/// OpenAPI documentation for the completion endpoints
#[derive(OpenApi)]
#[openapi(
    paths(check_openai, openai_completion, available_llms),
    components(schemas(
        AvailableLlms,
        Completion,
        CompletionChunk,
        CompletionRequest,
        LlmInfo,
        Message,
        Role,
        Usage
    )),
    tags(
        (name = "completion", description = "Language-model completion relay")
    )
)]
pub struct CompletionApiDoc;

/// Create router for the completion endpoints
pub fn router<P: CompletionProvider + 'static>(service: CompletionService<P>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/check-openai/", get(check_openai::<P>))
        .route("/openai-completion/", post(openai_completion::<P>))
        .route("/available-llms/", get(available_llms::<P>))
        .with_state(shared_service)
}

/// Whether the configured provider key is usable
#[utoipa::path(
    get,
    path = "/check-openai/",
    tag = "completion",
    responses(
        (status = 200, description = "Key validity; never an error", body = ApiEnvelope<bool, NoParams>)
    )
)]
pub async fn check_openai<P: CompletionProvider>(
    State(service): State<Arc<CompletionService<P>>>,
) -> Response {
    ApiEnvelope::ok(NoParams, service.check_key().await).into_response()
}

/// Relay a completion, batched or streamed
#[utoipa::path(
    post,
    path = "/openai-completion/",
    tag = "completion",
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Batched completion; `text/event-stream` of `CompletionChunk` frames when `stream_response` is true", body = ApiEnvelope<Completion, CompletionRequest>),
        (status = 400, description = "Empty prompt or unknown model"),
        (status = 401, description = "Provider key rejected"),
        (status = 502, description = "Provider rejected the request"),
        (status = 503, description = "Provider unreachable")
    )
)]
pub async fn openai_completion<P: CompletionProvider>(
    State(service): State<Arc<CompletionService<P>>>,
    ValidatedJson(request): ValidatedJson<CompletionRequest>,
) -> Response {
    let params = request.clone();
    match service.complete(request).await {
        Ok(CompletionOutput::Batched(completion)) => {
            ApiEnvelope::ok(params, completion).into_response()
        }
        Ok(CompletionOutput::Streamed(stream)) => Sse::new(sse_events(stream))
            .keep_alive(KeepAlive::default())
            .into_response(),
        Err(err) => AppError::from(err).into_envelope_response(params),
    }
}

/// Models the front-end may select
#[utoipa::path(
    get,
    path = "/available-llms/",
    tag = "completion",
    responses(
        (status = 200, description = "Models keyed by name", body = ApiEnvelope<AvailableLlms, NoParams>)
    )
)]
pub async fn available_llms<P: CompletionProvider>(
    State(service): State<Arc<CompletionService<P>>>,
) -> Response {
    respond(NoParams, Ok::<_, AppError>(service.available_llms()))
}

fn error_event(message: impl AsRef<str>) -> Event {
    Event::default().event("error").data(message.as_ref())
}

/// Map completion events onto the relay's SSE wire format.
fn sse_events(mut stream: CompletionStream) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(item) = stream.next().await {
            match item {
                Ok(CompletionEvent::Delta(chunk)) => match Event::default().json_data(&chunk) {
                    Ok(event) => yield Ok(event),
                    Err(e) => {
                        yield Ok(error_event(e.to_string()));
                        break;
                    }
                },
                Ok(CompletionEvent::Done) => {
                    yield Ok(Event::default().data(DONE_MARKER));
                    break;
                }
                Err(err) => {
                    yield Ok(error_event(err.to_string()));
                    break;
                }
            }
        }
    }
}
