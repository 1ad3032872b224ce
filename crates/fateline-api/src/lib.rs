//! Fateline API server library.
//!
//! Exposes the router and its state so integration tests can drive the
//! same stack `main` serves.

pub mod config;
pub mod error;
pub mod hub;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Builds the full router with permissive CORS.
pub fn build_router(state: AppState) -> Router {
    build_router_with_cors(state, CorsLayer::permissive())
}

/// Builds the full router: WebSocket transport plus the HTTP views.
pub fn build_router_with_cors(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ws::router())
        .nest("/api/v1/characters", routes::characters::router())
        .nest("/api/v1/rooms", routes::rooms::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins. No origins means any origin.
///
/// # Errors
///
/// Returns `AppError::Config` if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| AppError::Config(format!("invalid CORS origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
