//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fateline_api::build_router;
use fateline_api::state::AppState;
use fateline_content::domain::catalog::CharacterCatalog;
use fateline_table::application::dispatcher::Dispatcher;
use fateline_test_support::{FixedClock, MockRng, test_catalog};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// State over the test catalog with a fixed clock and lowest-value shuffles.
pub fn test_state() -> AppState {
    let catalog: Arc<dyn CharacterCatalog> = Arc::new(test_catalog());
    let dispatcher = Dispatcher::new(
        Arc::clone(&catalog),
        Arc::new(FixedClock::default()),
        Box::new(MockRng),
    );
    AppState::new(dispatcher, catalog)
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> Router {
    build_router(test_state())
}

/// Serve the full app on an ephemeral local port.
pub async fn spawn_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_test_app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
