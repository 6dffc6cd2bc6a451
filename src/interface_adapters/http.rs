// Shared HTTP response types for consistent API error payloads.

use crate::use_cases::{CommandError, RegistryError};
use axum::{Json, http::StatusCode};

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

// Helper to build a JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<RegistryError> for ErrorResponse {
    fn from(err: RegistryError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

pub fn map_registry_error(err: RegistryError) -> ApiError {
    let status = match err {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::AlreadyExists(_) | RegistryError::Pinned(_) => StatusCode::CONFLICT,
    };
    (status, Json(ErrorResponse::from(err)))
}

pub fn map_command_error(err: CommandError) -> ApiError {
    // The handle is still registered but its task has exited.
    error_response(StatusCode::GONE, err.to_string())
}
