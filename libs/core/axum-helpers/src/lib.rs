//! # Axum Helpers
//!
//! Shared HTTP plumbing for the document-querying services.
//!
//! ## Modules
//!
//! - **[`envelope`]**: the `{results, params, error}` response envelope
//! - **[`errors`]**: [`AppError`] and its status/error-code mapping
//! - **[`extractors`]**: validated JSON and query-string extractors
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = create_router::<ApiDoc>(Router::new()).await?;
//!     create_production_app(router, &ServerConfig::default(), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod envelope;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use envelope::{ApiEnvelope, NoParams, respond};

pub use errors::{AppError, ErrorCode};

pub use extractors::{ValidatedJson, ValidatedQuery};

pub use http::{
    cors_layer_from_origins, create_cors_layer, create_permissive_cors_layer, security_headers,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, create_router_with_cors, health_router, run_health_checks, shutdown_signal,
};
