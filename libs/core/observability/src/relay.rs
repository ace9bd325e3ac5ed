//! Metrics for the completion relay and its upstream services.

use metrics::{counter, histogram};
use std::time::Duration;

/// Relay metrics recorder
pub struct RelayMetrics;

impl RelayMetrics {
    /// Record a finished completion request.
    ///
    /// `mode` is `batched` or `streamed`; `outcome` is `ok` or `error`.
    pub fn record_completion(mode: &'static str, outcome: &'static str, elapsed: Duration) {
        counter!("completion_requests_total", "mode" => mode, "outcome" => outcome).increment(1);
        histogram!("completion_duration_seconds", "mode" => mode).record(elapsed.as_secs_f64());

        tracing::debug!(
            mode = mode,
            outcome = outcome,
            duration_ms = elapsed.as_millis() as u64,
            "Completion finished"
        );
    }

    pub fn record_stream_chunk() {
        counter!("completion_stream_chunks_total").increment(1);
    }

    /// Record a failed call to an upstream (`openai`, `qdrant`).
    pub fn record_upstream_error(service: &'static str, kind: &'static str) {
        counter!("upstream_errors_total", "service" => service, "kind" => kind).increment(1);
    }

    /// Record a vector store operation such as `list_collections` or `search`.
    pub fn record_vector_operation(operation: &'static str, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        counter!(
            "vector_operations_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }
}
