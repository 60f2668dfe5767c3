//! HTTP error mapping.
//!
//! Unknown ids surface as 404s, bad parameters as 400s, and anything
//! internal as an opaque 500 -- details go to the log, never the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use pitchside_world::WorldError;

/// Errors a handler can produce.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request itself is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Something failed on our side.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<WorldError> for ServerError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::UnknownLeague(_)
            | WorldError::UnknownTeam(_)
            | WorldError::UnknownPlayer(_)
            | WorldError::UnknownMatch(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<pitchside_store::StoreError> for ServerError {
    fn from(err: pitchside_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<pitchside_core::CoreError> for ServerError {
    fn from(err: pitchside_core::CoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => {
                error!(error = message, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal error"),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
