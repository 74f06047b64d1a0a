/// Unified error types for the inventory service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or empty required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown id, missing photo, or missing blob on the medium
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Blob storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No route matched the request
    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert ServiceError to HTTP response
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServiceError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            ServiceError::Database(_) | ServiceError::Storage(_) | ServiceError::Io(_) => {
                // Don't leak details to the client
                tracing::error!(error = %self, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
