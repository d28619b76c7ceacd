//! Client-side sign-in state for the Auth0 implicit flow
//!
//! After login Auth0 redirects to the callback URL with the access token in
//! the fragment (`#access_token=...&expires_in=...`). The session keeps that
//! token and its decoded claims so callers can decide which actions to offer.
//! Claims are decoded without verifying the signature; the API server does
//! the verification.

use super::store::TokenStore;
use crate::error::{Result, SdkError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use coffee_shop_common::Auth0Settings;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

const TOKEN_FRAGMENT_KEY: &str = "access_token=";

/// Claims read from an access token
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// Signed-in state of a client
#[derive(Debug, Clone)]
pub struct AuthSession {
    settings: Auth0Settings,
    token: Option<String>,
    payload: Option<TokenPayload>,
}

impl AuthSession {
    pub fn new(settings: Auth0Settings) -> Self {
        Self {
            settings,
            token: None,
            payload: None,
        }
    }

    /// Session restored from `store`. A stored token that cannot be decoded is discarded.
    pub async fn restore(settings: Auth0Settings, store: &TokenStore) -> Result<Self> {
        let mut session = Self::new(settings);
        if let Some(token) = store.load().await? {
            if let Err(e) = session.set_token(token) {
                warn!("Discarding stored token: {}", e);
                store.clear().await?;
            }
        }
        Ok(session)
    }

    /// Persist the current token, or clear the store when signed out
    pub async fn save(&self, store: &TokenStore) -> Result<()> {
        match &self.token {
            Some(token) => store.save(token).await,
            None => store.clear().await,
        }
    }

    /// Authorize link for the implicit flow, returning to `callback_path`
    pub fn login_url(&self, callback_path: &str) -> String {
        self.settings.login_url(callback_path)
    }

    pub fn logout_url(&self) -> String {
        self.settings.logout_url()
    }

    /// Take the token from a callback URL fragment.
    ///
    /// Returns `Ok(false)` when the URL carries no token.
    pub fn set_token_from_fragment(&mut self, url: &str) -> Result<bool> {
        let Some((_, fragment)) = url.split_once('#') else {
            return Ok(false);
        };

        let token = fragment
            .split('&')
            .find_map(|pair| pair.strip_prefix(TOKEN_FRAGMENT_KEY))
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => {
                self.set_token(token.to_string())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the token, decoding its claims
    pub fn set_token(&mut self, token: String) -> Result<()> {
        let payload = decode_payload(&token)?;
        debug!("Signed in as {:?}", payload.sub);
        self.payload = Some(payload);
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn payload(&self) -> Option<&TokenPayload> {
        self.payload.as_ref()
    }

    /// Whether the token grants `permission`
    pub fn can(&self, permission: &str) -> bool {
        self.payload
            .as_ref()
            .is_some_and(|p| p.permissions.iter().any(|granted| granted == permission))
    }

    /// True when signed out or past the token's `exp`
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    fn is_expired_at(&self, now: i64) -> bool {
        match &self.payload {
            Some(payload) => payload.exp.is_some_and(|exp| exp <= now),
            None => true,
        }
    }

    /// Sign out locally
    pub fn clear(&mut self) {
        self.token = None;
        self.payload = None;
    }
}

/// Decode the claims segment of a JWT without verifying it
pub fn decode_payload(token: &str) -> Result<TokenPayload> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, claims, _] = segments.as_slice() else {
        return Err(SdkError::InvalidToken {
            message: format!("expected 3 segments, found {}", segments.len()),
        });
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(claims.trim_end_matches('='))
        .map_err(|e| SdkError::InvalidToken {
            message: format!("claims are not base64url: {e}"),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| SdkError::InvalidToken {
        message: format!("claims are not JSON: {e}"),
    })
}
