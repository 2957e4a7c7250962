//! Unified error handling for the API.
//!
//! Every domain error is recovered at the request boundary and mapped to
//! an HTTP status with a human-readable JSON message; nothing propagates
//! as an unhandled fault. Store and internal failures are logged and
//! reported to clients without detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::FilterError;
use crate::services::applications::ApplicationError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input or filter value.
    #[error("{0}")]
    Validation(String),

    /// Duplicate resource (e.g., email already registered).
    #[error("{0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Missing/invalid token or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but insufficient role.
    #[error("{0}")]
    Forbidden(String),

    /// Store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Storage(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::EmailTaken => Self::Conflict(error.to_string()),
            AuthError::UnknownUser => Self::NotFound(error.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(error.to_string()),
            AuthError::Store(store) => Self::Storage(store),
            AuthError::Hash(_) | AuthError::Token(_) => Self::Internal(error.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::NotFound(_) => Self::NotFound(error.to_string()),
            // Resolving a resolved application is a domain-state error; the
            // boundary reports it as a plain bad request.
            ApplicationError::AlreadyResolved(_) | ApplicationError::EmptyComment => {
                Self::Validation(error.to_string())
            }
            ApplicationError::Store(store) => Self::Storage(store),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(error: FilterError) -> Self {
        Self::Validation(error.to_string())
    }
}
