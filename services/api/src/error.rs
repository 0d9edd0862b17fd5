//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! mapping onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use crate::config::ConfigError;
use wordshelf_core::ports::PortError;

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

    /// Represents a migration failure at startup.
    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Port(port_error) => match port_error {
                PortError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, port_error.to_string())
                }
                PortError::NotFound(_) => (StatusCode::NOT_FOUND, port_error.to_string()),
                PortError::DuplicateEntry => (StatusCode::CONFLICT, port_error.to_string()),
                PortError::EmptyWord | PortError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, port_error.to_string())
                }
                PortError::Provider(_) => (StatusCode::BAD_GATEWAY, port_error.to_string()),
                PortError::Unexpected(_) => {
                    error!("unexpected port error: {port_error}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            other => {
                error!("request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: PortError) -> StatusCode {
        ApiError::Port(error).into_response().status()
    }

    #[test]
    fn port_errors_map_to_expected_statuses() {
        assert_eq!(status_of(PortError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(PortError::NotFound("Word".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(PortError::DuplicateEntry), StatusCode::CONFLICT);
        assert_eq!(status_of(PortError::EmptyWord), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(PortError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PortError::Provider("down".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(PortError::Unexpected("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
