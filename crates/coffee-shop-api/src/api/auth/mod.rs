//! Authentication module for the Coffee Shop API
//!
//! Access tokens are Auth0 RS256 JWTs. Their `permissions` claim carries the
//! RBAC permissions checked by each protected route.

pub mod jwt_validator;

pub use jwt_validator::{JwkSet, JwksVerifier};

use crate::error::ApiError;
use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Authentication failure reported to the client as `{code, description}`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub status: StatusCode,
    pub code: &'static str,
    pub description: &'static str,
}

impl AuthError {
    const fn new(status: StatusCode, code: &'static str, description: &'static str) -> Self {
        Self {
            status,
            code,
            description,
        }
    }

    pub fn header_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "authorization_header_missing",
            "Authorization header is expected.",
        )
    }

    pub fn invalid_header(description: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_header", description)
    }

    /// The token header cannot be read or carries no `kid`
    pub fn malformed() -> Self {
        Self::invalid_header("Authorization malformed.")
    }

    pub fn unknown_key() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Unable to find the appropriate key.",
        )
    }

    pub fn expired() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "token_expired", "Token expired.")
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_claims",
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub fn unparseable() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Unable to parse authentication token.",
        )
    }

    pub fn permissions_missing() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_claims",
            "Permissions not included in JWT.",
        )
    }

    pub fn permission_denied() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "unauthorized",
            "Permission not found.",
        )
    }
}

/// Claims carried by an Auth0 access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Audience, a string or an array of strings
    pub aud: serde_json::Value,
    /// Issuer
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub scope: Option<String>,
    /// RBAC permissions granted to the subject
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    /// Custom claims
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Check a permission the way protected routes do
    pub fn check_permission(&self, permission: &str) -> Result<(), AuthError> {
        let permissions = self
            .permissions
            .as_ref()
            .ok_or_else(AuthError::permissions_missing)?;

        if permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AuthError::permission_denied())
        }
    }
}

/// Verifies a bearer token and returns its claims
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Option<Vec<&str>>) -> Claims {
        Claims {
            sub: "auth0|barista".to_string(),
            aud: serde_json::json!("drink"),
            iss: "https://dev-0m5bkb0u.us.auth0.com/".to_string(),
            exp: 0,
            iat: 0,
            scope: None,
            permissions: permissions.map(|p| p.into_iter().map(String::from).collect()),
            custom: HashMap::new(),
        }
    }

    #[test]
    fn test_check_permission() {
        let barista = claims(Some(vec!["get:drinks-detail"]));
        assert!(barista.check_permission("get:drinks-detail").is_ok());
        assert_eq!(
            barista.check_permission("delete:drinks"),
            Err(AuthError::permission_denied())
        );
    }

    #[test]
    fn test_missing_permissions_claim() {
        let err = claims(None).check_permission("post:drinks").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "invalid_claims");
    }

    #[test]
    fn test_empty_permissions_is_denied_not_missing() {
        let err = claims(Some(vec![])).check_permission("post:drinks").unwrap_err();
        assert_eq!(err, AuthError::permission_denied());
    }
}
