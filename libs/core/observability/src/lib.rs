//! Observability utilities for the document-querying services.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Relay metrics for completions, upstream failures and vector operations
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, RelayMetrics};
//!
//! init_metrics()?;
//!
//! RelayMetrics::record_completion("streamed", "ok", started.elapsed());
//! RelayMetrics::record_upstream_error("openai", "timeout");
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod relay;

pub use middleware::metrics_middleware;
pub use relay::RelayMetrics;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder.
///
/// Idempotent: later calls return the handle installed by the first one.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Completion relay
    describe_counter!(
        "completion_requests_total",
        "Completion requests by mode and outcome"
    );
    describe_histogram!(
        "completion_duration_seconds",
        "Time from request to final chunk, by mode"
    );
    describe_counter!(
        "completion_stream_chunks_total",
        "Chunks relayed to streaming clients"
    );

    // Upstreams
    describe_counter!(
        "upstream_errors_total",
        "Upstream failures by service and kind"
    );
    describe_counter!(
        "vector_operations_total",
        "Vector store operations by operation and outcome"
    );
}
