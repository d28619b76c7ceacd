//! Error types for the Coffee Shop SDK

use thiserror::Error;

/// Errors returned by the SDK
#[derive(Debug, Error)]
pub enum SdkError {
    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The configured base URL cannot be used
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The environment record failed validation
    #[error(transparent)]
    Environment(#[from] coffee_shop_common::EnvironmentError),

    /// No `Authorization` header was sent
    #[error("Authentication required: {description}")]
    MissingAuthentication { description: String },

    /// The token was rejected (malformed, expired, wrong audience...)
    #[error("Authentication error ({code}): {description}")]
    Authentication { code: String, description: String },

    /// The token lacks the permission the route requires
    #[error("Authorization error: {description}")]
    Authorization { description: String },

    /// Not found
    #[error("Resource not found")]
    NotFound,

    /// The server rejected the submitted drink
    #[error("Unprocessable request")]
    Unprocessable,

    /// Bad request with message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Service unavailable
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    /// A JWT could not be decoded
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Token persistence failed
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SdkError>;

impl SdkError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, SdkError::HttpClient(_) | SdkError::ServiceUnavailable)
    }

    /// Whether signing in again could resolve this error
    pub fn requires_login(&self) -> bool {
        match self {
            SdkError::MissingAuthentication { .. } => true,
            SdkError::Authentication { code, .. } => code == "token_expired",
            _ => false,
        }
    }
}
