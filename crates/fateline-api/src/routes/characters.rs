//! Catalog endpoint for character selection screens.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use fateline_content::application::query_handlers::{self, CatalogView};

use crate::state::AppState;

/// GET /api/v1/characters
async fn list_characters(State(state): State<AppState>) -> Json<CatalogView> {
    Json(query_handlers::get_catalog(state.catalog.as_ref()))
}

/// Returns the characters router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_characters))
}
