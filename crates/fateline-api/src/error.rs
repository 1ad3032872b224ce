//! Fateline API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fateline_content::domain::catalog::CatalogError;
use fateline_core::error::{DomainError, ErrorCategory};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the server process.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable holds an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The character catalog failed to load.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The tracing subscriber or span exporter failed to start.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if matches!(self.0, DomainError::RoomNotFound(_)) {
            return StatusCode::NOT_FOUND;
        }
        match self.0.category() {
            ErrorCategory::Authorization => StatusCode::FORBIDDEN,
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCategory::Precondition
            | ErrorCategory::ResourceEmpty
            | ErrorCategory::Undo
            | ErrorCategory::Session => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_room_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::RoomNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_authorization_maps_to_403() {
        assert_eq!(status_of(DomainError::OwnerOnly), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_rule_refusals_map_to_409() {
        assert_eq!(status_of(DomainError::DeckEmpty), StatusCode::CONFLICT);
        assert_eq!(status_of(DomainError::NothingToUndo), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::AnotherSessionActive),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("lock poisoned".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
