//! Error types for the Coffee Shop API

use crate::api::auth::AuthError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coffee_shop_common::types::{DrinkValidationError, ErrorBody};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Main error type for the Coffee Shop API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] coffee_shop_common::ConfigurationError),

    /// Authentication or authorization failure
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Not found
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Request understood but cannot be processed
    #[error("Unprocessable request: {message}")]
    Unprocessable { message: String },

    /// Bodiless error response produced outside the handlers
    /// (method not allowed, request timeout)
    #[error("HTTP error: {status}")]
    Status { status: StatusCode },

    /// An upstream dependency (the JWKS endpoint) could not be reached
    #[error("Service temporarily unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<DrinkValidationError> for ApiError {
    fn from(err: DrinkValidationError) -> Self {
        ApiError::Unprocessable {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateTitle(title) => ApiError::Unprocessable {
                message: format!("Duplicate drink title: {title}"),
            },
            StorageError::CorruptRecipe(e) => ApiError::Serialization(e),
            StorageError::Database(e) => ApiError::Database(e),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::Unprocessable {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(auth) => auth.status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Status { status } => *status,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Serialization(_)
            | ApiError::Internal { .. }
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `message` member of the error body
    fn message(&self) -> Value {
        match self {
            ApiError::Auth(auth) => json!({
                "code": auth.code,
                "description": auth.description,
            }),
            ApiError::NotFound { .. } => json!("resource not found"),
            ApiError::Unprocessable { .. } => json!("unprocessable"),
            ApiError::Status { status } => {
                json!(status.canonical_reason().unwrap_or("error").to_lowercase())
            }
            ApiError::ServiceUnavailable { .. } => json!("service unavailable"),
            _ => json!("internal server error"),
        }
    }

    /// Check if error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}
