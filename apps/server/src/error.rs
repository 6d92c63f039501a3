//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use todo_store::{NameError, TodoStoreError};

/// Error codes carried in error response bodies.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rejected list or item name.
    #[error(transparent)]
    Validation(#[from] NameError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Store(#[from] TodoStoreError),
}

impl ServerError {
    /// The list addressed by the request does not exist.
    pub fn list_not_found() -> Self {
        Self::NotFound("The specified list was not found.".to_string())
    }

    /// The todo addressed by the request does not exist.
    pub fn todo_not_found() -> Self {
        Self::NotFound("The specified todo was not found.".to_string())
    }
}

fn not_found_message(entity_type: &str) -> String {
    match entity_type {
        "TodoItem" => "The specified todo was not found.".to_string(),
        _ => "The specified list was not found.".to_string(),
    }
}

fn conflict_message(entity_type: &str) -> String {
    match entity_type {
        "TodoItem" => NameError::ItemNameTaken.to_string(),
        _ => NameError::ListNameTaken.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, msg.clone())
            }
            ServerError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::VALIDATION_FAILED,
                e.to_string(),
            ),
            ServerError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND, msg.clone())
            }
            ServerError::Store(TodoStoreError::NotFound { entity_type, .. }) => (
                StatusCode::NOT_FOUND,
                error_codes::RESOURCE_NOT_FOUND,
                not_found_message(entity_type),
            ),
            ServerError::Store(TodoStoreError::AlreadyExists { entity_type, .. }) => (
                StatusCode::CONFLICT,
                error_codes::ALREADY_EXISTS,
                conflict_message(entity_type),
            ),
            ServerError::Store(e) => {
                tracing::error!(error = %e, "Storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
