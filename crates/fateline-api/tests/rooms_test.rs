//! Integration tests for the room snapshot endpoint.

mod common;

use axum::http::StatusCode;
use fateline_api::build_router;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_get_room_returns_public_snapshot() {
    // Arrange
    let state = common::test_state();
    let owner = Uuid::new_v4();
    let created = state
        .dispatcher()
        .unwrap()
        .handle_frame(owner, "room:create", json!({ "name": "Ada" }));
    let room_id = created.response["roomId"].as_str().unwrap().to_string();
    let app = build_router(state);

    // Act
    let (status, json) = common::get_json(app, &format!("/api/v1/rooms/{room_id}")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["roomId"], room_id);
    assert_eq!(json["ownerId"], owner.to_string());
    assert_eq!(json["meta"]["phase"], "lobby");
    assert_eq!(json["players"][0]["name"], "Ada");
    assert!(json.get("hand").is_none());
}

#[tokio::test]
async fn test_get_unknown_room_returns_404() {
    let app = common::build_test_app();

    let (status, json) =
        common::get_json(app, &format!("/api/v1/rooms/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "room_not_found");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_get_room_with_malformed_id_returns_400() {
    let app = common::build_test_app();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/rooms/not-a-uuid")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
