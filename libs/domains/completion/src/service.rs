use std::time::Instant;

use futures::StreamExt;
use observability::RelayMetrics;
use tracing::instrument;
use validator::Validate;

use crate::error::{CompletionError, CompletionResult};
use crate::models::{
    AvailableLlms, CompletionEvent, CompletionMode, CompletionOutput, CompletionRequest,
    CompletionStream, LlmInfo,
};
use crate::provider::CompletionProvider;

/// Relays completion requests to a [`CompletionProvider`].
///
/// The request's `stream_response` flag selects between one batched
/// [`crate::Completion`] and a lazy stream of chunks. Streams are passed
/// through as they arrive; nothing is buffered.
pub struct CompletionService<P: CompletionProvider> {
    provider: P,
}

impl<P: CompletionProvider> CompletionService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[instrument(skip(self, request), fields(mode = request.mode().as_str()))]
    pub async fn complete(&self, request: CompletionRequest) -> CompletionResult<CompletionOutput> {
        request.validate()?;
        self.ensure_model_available(&request)?;

        let started = Instant::now();
        let mode = request.mode();
        match mode {
            CompletionMode::Batched => {
                let completion = self
                    .provider
                    .complete(&request)
                    .await
                    .inspect_err(|err| record_failure(mode, err, started))?;
                RelayMetrics::record_completion(mode.as_str(), "ok", started.elapsed());
                Ok(CompletionOutput::Batched(completion))
            }
            CompletionMode::Streamed => {
                let stream = self
                    .provider
                    .stream(&request)
                    .await
                    .inspect_err(|err| record_failure(mode, err, started))?;
                Ok(CompletionOutput::Streamed(instrument_stream(stream, started)))
            }
        }
    }

    /// Whether the provider accepts the configured credential.
    pub async fn check_key(&self) -> bool {
        let valid = self.provider.check_key().await;
        tracing::info!(valid, "Checked completion provider credential");
        valid
    }

    pub fn available_llms(&self) -> AvailableLlms {
        let default = self.provider.default_model();
        self.provider
            .available_models()
            .into_iter()
            .map(|model_name| LlmInfo {
                is_default: model_name == default,
                model_name,
                provider: "openai".to_string(),
            })
            .collect()
    }

    fn ensure_model_available(&self, request: &CompletionRequest) -> CompletionResult<()> {
        let Some(model) = request.model.as_deref() else {
            return Ok(());
        };
        if self.provider.available_models().iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(CompletionError::Validation(format!(
                "model: {} is not available",
                model
            )))
        }
    }
}

fn record_failure(mode: CompletionMode, err: &CompletionError, started: Instant) {
    RelayMetrics::record_completion(mode.as_str(), "error", started.elapsed());
    RelayMetrics::record_upstream_error("openai", err.kind());
    tracing::warn!(error = %err, mode = mode.as_str(), "Completion failed");
}

/// Count chunks as they pass and record the outcome once the stream ends.
/// Nothing is yielded after the first error.
fn instrument_stream(mut stream: CompletionStream, started: Instant) -> CompletionStream {
    Box::pin(async_stream::stream! {
        let mut chunks = 0usize;
        let mut outcome = "ok";

        while let Some(item) = stream.next().await {
            let failed = match &item {
                Ok(CompletionEvent::Delta(_)) => {
                    chunks += 1;
                    RelayMetrics::record_stream_chunk();
                    false
                }
                Ok(CompletionEvent::Done) => false,
                Err(err) => {
                    outcome = "error";
                    RelayMetrics::record_upstream_error("openai", err.kind());
                    tracing::warn!(error = %err, chunks, "Completion stream failed");
                    true
                }
            };

            yield item;
            if failed {
                break;
            }
        }

        RelayMetrics::record_completion(CompletionMode::Streamed.as_str(), outcome, started.elapsed());
        tracing::info!(chunks, outcome, "Completion stream finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Completion, CompletionChunk, Message};
    use crate::provider::MockCompletionProvider;
    use futures::stream;

    fn completion(text: &str) -> Completion {
        Completion {
            message: Message::assistant(text),
            finish_reason: Some("stop".to_string()),
            model: "gpt-4o-mini".to_string(),
            usage: None,
        }
    }

    fn delta(index: usize, content: &str) -> CompletionResult<CompletionEvent> {
        Ok(CompletionEvent::Delta(CompletionChunk {
            index,
            content: content.to_string(),
        }))
    }

    fn provider_with_models() -> MockCompletionProvider {
        let mut mock = MockCompletionProvider::new();
        mock.expect_default_model()
            .returning(|| "gpt-4o-mini".to_string());
        mock.expect_available_models()
            .returning(|| vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]);
        mock
    }

    async fn collect_text(stream: CompletionStream) -> (String, Vec<CompletionResult<CompletionEvent>>) {
        let items: Vec<_> = stream.collect().await;
        let text = items
            .iter()
            .filter_map(|item| match item {
                Ok(CompletionEvent::Delta(chunk)) => Some(chunk.content.as_str()),
                _ => None,
            })
            .collect();
        (text, items)
    }

    #[tokio::test]
    async fn test_batched_request_returns_completion() {
        let mut mock = provider_with_models();
        mock.expect_complete()
            .withf(|request| request.user_prompt == "What is the refund policy?")
            .times(1)
            .returning(|_| Ok(completion("Refunds within 30 days.")));
        mock.expect_stream().never();

        let service = CompletionService::new(mock);
        let output = service
            .complete(CompletionRequest::new("What is the refund policy?"))
            .await
            .unwrap();

        match output {
            CompletionOutput::Batched(c) => assert_eq!(c.message.content, "Refunds within 30 days."),
            other => panic!("expected batched output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_streamed_request_passes_chunks_through() {
        let mut mock = provider_with_models();
        mock.expect_complete().never();
        mock.expect_stream().times(1).returning(|_| {
            Ok(Box::pin(stream::iter(vec![
                delta(0, "Refunds "),
                delta(1, "within 30 days."),
                Ok(CompletionEvent::Done),
            ])) as CompletionStream)
        });

        let service = CompletionService::new(mock);
        let output = service
            .complete(CompletionRequest::new("hi").streamed())
            .await
            .unwrap();

        let CompletionOutput::Streamed(stream) = output else {
            panic!("expected streamed output");
        };
        let (text, items) = collect_text(stream).await;
        assert_eq!(text, "Refunds within 30 days.");
        assert!(matches!(items.last(), Some(Ok(CompletionEvent::Done))));
    }

    #[tokio::test]
    async fn test_stream_stops_after_first_error() {
        let mut mock = provider_with_models();
        mock.expect_stream().returning(|_| {
            Ok(Box::pin(stream::iter(vec![
                delta(0, "Refunds "),
                Err(CompletionError::Interrupted("connection reset".into())),
                delta(1, "never seen"),
            ])) as CompletionStream)
        });

        let service = CompletionService::new(mock);
        let CompletionOutput::Streamed(stream) = service
            .complete(CompletionRequest::new("hi").streamed())
            .await
            .unwrap()
        else {
            panic!("expected streamed output");
        };

        let (text, items) = collect_text(stream).await;
        assert_eq!(text, "Refunds ");
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_stream_open_failure_is_returned_directly() {
        let mut mock = provider_with_models();
        mock.expect_stream()
            .returning(|_| Err(CompletionError::InvalidCredential("bad key".into())));

        let service = CompletionService::new(mock);
        let result = service.complete(CompletionRequest::new("hi").streamed()).await;
        assert!(matches!(result, Err(CompletionError::InvalidCredential(_))));
    }

    #[tokio::test]
    async fn test_blank_prompt_never_reaches_provider() {
        let mut mock = provider_with_models();
        mock.expect_complete().never();
        mock.expect_stream().never();

        let service = CompletionService::new(mock);
        let result = service.complete(CompletionRequest::new("  ")).await;
        assert!(matches!(result, Err(CompletionError::Validation(msg)) if msg.contains("user_prompt")));
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected() {
        let mut mock = provider_with_models();
        mock.expect_complete().never();

        let service = CompletionService::new(mock);
        let result = service
            .complete(CompletionRequest::new("hi").with_model("gpt-2"))
            .await;
        assert!(matches!(result, Err(CompletionError::Validation(msg)) if msg.contains("gpt-2")));
    }

    #[test]
    fn test_available_llms_marks_default() {
        let service = CompletionService::new(provider_with_models());
        let llms = service.available_llms();

        assert_eq!(llms.len(), 2);
        assert!(llms.get("gpt-4o-mini").unwrap().is_default);
        assert!(!llms.get("gpt-4o").unwrap().is_default);
        assert_eq!(llms.get("gpt-4o").unwrap().provider, "openai");
    }

    #[tokio::test]
    async fn test_check_key_reports_provider_answer() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_check_key().times(1).returning(|| false);

        let service = CompletionService::new(mock);
        assert!(!service.check_key().await);
    }
}
