//! Integration tests for the CORS configuration.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fateline_api::{build_router_with_cors, cors_layer};
use tower::ServiceExt;

fn request_from(origin: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_configured_origin_is_allowed() {
    // Arrange
    let cors = cors_layer(&["https://table.example".to_owned()]).unwrap();
    let app = build_router_with_cors(common::test_state(), cors);

    // Act
    let response = app
        .oneshot(request_from("https://table.example"))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://table.example"
    );
}

#[tokio::test]
async fn test_other_origins_get_no_allow_header() {
    let cors = cors_layer(&["https://table.example".to_owned()]).unwrap();
    let app = build_router_with_cors(common::test_state(), cors);

    let response = app
        .oneshot(request_from("https://elsewhere.example"))
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
