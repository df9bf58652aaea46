use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use gambit_core::{CoreError, ErrorKind};

/// Transport-facing wrapper around [`CoreError`].
///
/// Domain failures map to status codes by their kind; storage faults are
/// reported as opaque 500s so record internals never leak to clients.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            ErrorKind::Conflict => (StatusCode::CONFLICT, self.0.to_string()),
            ErrorKind::InvalidState => (StatusCode::CONFLICT, self.0.to_string()),
            ErrorKind::IllegalInput => (StatusCode::BAD_REQUEST, self.0.to_string()),
            ErrorKind::Internal => {
                tracing::error!(error = %self.0, "internal error serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
