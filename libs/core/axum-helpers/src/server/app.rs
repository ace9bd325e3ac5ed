use super::shutdown::{ShutdownCoordinator, shutdown_signal};
use crate::errors::handlers::not_found;
use crate::http::{cors_layer_from_origins, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Starts the Axum server with a plain Ctrl+C / SIGTERM shutdown.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails while running.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Creates the application router with documentation UIs and common middleware.
///
/// Routes in `apis` are mounted at the root, so the public paths are exactly
/// the ones the handlers declare (`/api-status/`, `/openai-completion/`, ...).
/// This sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar)
/// - tracing, security headers, CORS and compression layers
/// - an envelope-shaped 404 fallback
///
/// CORS origins come from the optional `CORS_ALLOWED_ORIGIN` environment
/// variable (comma separated). When it is unset every origin is allowed.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` is set but empty or invalid.
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let origins = std::env::var("CORS_ALLOWED_ORIGIN").ok();
    create_router_with_cors::<T>(apis, origins.as_deref())
}

/// Same as [`create_router`] with the CORS origin list passed explicitly.
pub fn create_router_with_cors<T>(apis: Router, cors_origins: Option<&str>) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = cors_layer_from_origins(cors_origins)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        // The default predicate leaves text/event-stream uncompressed.
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Production server with coordinated shutdown and a bounded cleanup phase.
///
/// On SIGINT/SIGTERM the server stops accepting connections, in-flight
/// requests drain, and `cleanup` runs for at most
/// `server_config.shutdown_timeout`.
///
/// ```ignore
/// create_production_app(router, &config.server, async move {
///     tracing::info!("nothing to close");
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();
    let shutdown_timeout = server_config.shutdown_timeout;

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        // Sender dropped without a signal also means the server is gone.
        let _ = shutdown_rx.recv().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let signal_coordinator = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal_coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // Server errors skip the signal path; make sure cleanup still runs.
    coordinator.shutdown();
    drop(coordinator);
    cleanup_handle.await.ok();

    serve_result
}
