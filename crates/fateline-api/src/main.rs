//! Fateline API server entry point.

use std::sync::Arc;

use fateline_api::config::ServerConfig;
use fateline_api::error::AppError;
use fateline_api::state::AppState;
use fateline_api::{build_router_with_cors, cors_layer, telemetry};
use fateline_content::domain::catalog::{CharacterCatalog, StaticCatalog};
use fateline_core::clock::SystemClock;
use fateline_core::rng::SystemRng;
use fateline_table::application::dispatcher::Dispatcher;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServerConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    info!("Starting Fateline API server");

    let catalog: Arc<dyn CharacterCatalog> = Arc::new(load_catalog(&config)?);
    let rng = match config.rng_seed {
        Some(seed) => {
            warn!(seed, "using a fixed shuffle seed");
            SystemRng::seeded(seed)
        }
        None => SystemRng::from_os(),
    };
    let dispatcher = Dispatcher::new(Arc::clone(&catalog), Arc::new(SystemClock), Box::new(rng));
    if config.cors_origins.is_empty() {
        warn!("no CORS origins configured; allowing any origin");
    }
    let cors = cors_layer(&config.cors_origins)?;
    let app = build_router_with_cors(AppState::new(dispatcher, catalog), cors);

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    telemetry.shutdown();
    Ok(())
}

fn load_catalog(config: &ServerConfig) -> Result<StaticCatalog, AppError> {
    let Some(path) = &config.catalog_path else {
        return Ok(StaticCatalog::builtin()?);
    };
    let source = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    let catalog = StaticCatalog::from_yaml(&source)?;
    info!(path = %path.display(), "loaded catalog from file");
    Ok(catalog)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
