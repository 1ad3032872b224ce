//! Room snapshot endpoint for spectators and reconnect screens.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use fateline_table::application::projection::PublicRoom;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/rooms/{room_id}
async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<PublicRoom>, ApiError> {
    let snapshot = state.dispatcher()?.public_snapshot(room_id)?;
    Ok(Json(snapshot))
}

/// Returns the rooms router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{room_id}", get(get_room))
}
