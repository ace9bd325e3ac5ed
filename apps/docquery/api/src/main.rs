use axum::{middleware, routing::get};
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use observability::{init_metrics, metrics_handler, metrics_middleware};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    init_metrics()?;

    info!(
        qdrant = %config.qdrant.url,
        openai = %config.openai.base_url,
        model = %config.openai.model,
        "Configuring upstream clients"
    );

    let state = AppState::new(config)?;

    let api_routes = api::routes(&state);

    // Docs UIs, CORS, tracing and the envelope 404 fallback
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware));

    info!(
        "Starting document querying API (shutdown timeout {:?})",
        state.config.server.shutdown_timeout
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, async move {
        info!("Shutting down: releasing upstream clients");
        drop(state);
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Document querying API shutdown complete");
    Ok(())
}
