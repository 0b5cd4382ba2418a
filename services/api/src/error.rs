//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and its mapping
//! onto the HTTP error envelope `{ "error": string }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use gallery_core::ports::PortError;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    /// Maps the error taxonomy to the HTTP envelope. Internal detail is
    /// logged, never surfaced: 500s carry a generic message.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Port(PortError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Port(PortError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "You must be signed in for this operation".to_string(),
            ),
            ApiError::Port(PortError::Forbidden(msg)) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Port(PortError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            other => {
                error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_their_status_codes() {
        let cases = [
            (PortError::Validation("name required".into()), StatusCode::BAD_REQUEST),
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::Forbidden("not yours".into()), StatusCode::FORBIDDEN),
            (PortError::NotFound("no such component".into()), StatusCode::NOT_FOUND),
            (PortError::Unexpected("pool exhausted".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = ApiError::Port(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
