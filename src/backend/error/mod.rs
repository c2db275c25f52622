//! Backend error type and its HTTP mapping.
//!
//! One taxonomy for every handler: `Unauthenticated`, `Forbidden`,
//! `NotFound` and `Validation` surface directly to the caller as terminal
//! failures of that single operation and are never retried server-side.
//! Database and internal errors are logged and collapsed to a 500 without
//! leaking details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure of a single API operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No credential, or the credential was rejected.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated but lacking the project role for this action.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced task/project/user is absent.
    #[error("{0}")]
    NotFound(String),

    /// Malformed input fields.
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Persistence failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
