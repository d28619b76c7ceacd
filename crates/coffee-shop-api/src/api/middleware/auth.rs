//! Bearer token authentication for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::{
    api::auth::{AuthError, Claims},
    error::ApiError,
    server::AppState,
};

/// Authenticated caller of a protected route
///
/// Extracting this from a request validates the bearer token with the
/// configured [`TokenVerifier`](crate::api::auth::TokenVerifier). Handlers
/// then check the permission they need with [`AuthContext::require_permission`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    /// Subject (user identifier) of the token
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Fail unless the token's `permissions` claim grants `permission`
    pub fn require_permission(&self, permission: &str) -> Result<(), ApiError> {
        self.claims.check_permission(permission).map_err(|e| {
            debug!(
                "Subject {} lacks permission {}: {}",
                self.claims.sub, permission, e
            );
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state.verifier.verify(token).await?;
        Ok(Self { claims })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::invalid_header("Authorization header must start with \"Bearer\"."))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or_else(AuthError::header_missing)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    let token = parts
        .next()
        .ok_or_else(|| AuthError::invalid_header("Token not found."))?;

    if parts.next().is_some() {
        return Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(&headers("bearer abc")), Ok("abc"));
    }

    #[test]
    fn test_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, "authorization_header_missing");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_malformed_headers() {
        let cases = [
            ("Basic abc", "Authorization header must start with \"Bearer\"."),
            ("Bearer", "Token not found."),
            ("Bearer abc def", "Authorization header must be bearer token."),
        ];

        for (value, description) in cases {
            let err = extract_bearer_token(&headers(value)).unwrap_err();
            assert_eq!(err.code, "invalid_header", "{value}");
            assert_eq!(err.description, description, "{value}");
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }
    }
}
