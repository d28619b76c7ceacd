//! JWT validation against the Auth0 tenant's JSON Web Key Set
//!
//! Public keys are fetched from the tenant's JWKS endpoint and cached with a
//! TTL. A token signed with a key id missing from the cached set forces a
//! single refetch so rotated keys are picked up without waiting for expiry.
//! Forced refetches happen at most once per [`MIN_REFRESH_INTERVAL`], and
//! concurrent misses share one request.

use super::{AuthError, Claims, TokenVerifier};
use crate::config::AuthConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Minimum time between refetches triggered by unknown key ids
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JSON Web Key Set structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub r#use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl JwkSet {
    /// RSA decoding key for `kid`, if the set holds a usable one
    pub fn decoding_key(&self, kid: &str) -> Option<DecodingKey> {
        let jwk = self
            .keys
            .iter()
            .find(|k| k.kty == "RSA" && k.kid.as_deref() == Some(kid))?;

        let (n, e) = (jwk.n.as_deref()?, jwk.e.as_deref()?);
        match DecodingKey::from_rsa_components(n, e) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("JWK {} has invalid RSA components: {}", kid, e);
                None
            }
        }
    }
}

/// Token verifier backed by a remote JWKS
pub struct JwksVerifier {
    client: reqwest::Client,
    jwks_url: String,
    validation: Validation,
    cache: Cache<String, Arc<JwkSet>>,
    last_refresh: Mutex<Option<Instant>>,
}

impl JwksVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("coffee-shop-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer()]);
        validation.leeway = config.allowed_clock_skew().as_secs();

        let cache = Cache::builder()
            .time_to_live(config.jwks_cache_ttl())
            .max_capacity(16)
            .build();

        Ok(Self {
            client,
            jwks_url: config.jwks_url(),
            validation,
            cache,
            last_refresh: Mutex::new(None),
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Cached key set, fetching it when absent
    async fn key_set(&self) -> Result<Arc<JwkSet>, ApiError> {
        self.cache
            .try_get_with(self.jwks_url.clone(), async {
                self.fetch().await.map(Arc::new)
            })
            .await
            .map_err(|message| ApiError::ServiceUnavailable {
                message: message.to_string(),
            })
    }

    /// Drop the cached key set and fetch it again, unless that already
    /// happened within [`MIN_REFRESH_INTERVAL`]
    async fn refresh_key_set(&self) -> Result<Arc<JwkSet>, ApiError> {
        let mut last_refresh = self.last_refresh.lock().await;
        match *last_refresh {
            Some(at) if at.elapsed() < MIN_REFRESH_INTERVAL => {
                debug!("JWKS refreshed {:?} ago, keeping cached set", at.elapsed());
            }
            _ => {
                *last_refresh = Some(Instant::now());
                self.cache.invalidate(&self.jwks_url).await;
            }
        }
        self.key_set().await
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.jwks_url))]
    async fn fetch(&self) -> Result<JwkSet, String> {
        let unavailable = |message: String| {
            warn!("{}", message);
            message
        };

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to fetch JWKS: {e}")))?;

        if !response.status().is_success() {
            return Err(unavailable(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse JWKS JSON: {e}")))?;

        debug!("Fetched JWKS with {} keys", jwks.keys.len());
        Ok(jwks)
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    #[instrument(level = "debug", skip_all)]
    async fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let header = decode_header(token).map_err(|_| AuthError::malformed())?;
        let kid = header.kid.ok_or_else(AuthError::malformed)?;

        let key = match self.key_set().await?.decoding_key(&kid) {
            Some(key) => key,
            None => {
                debug!("Key {} not in cached JWKS, refetching", kid);
                self.refresh_key_set()
                    .await?
                    .decoding_key(&kid)
                    .ok_or_else(AuthError::unknown_key)?
            }
        };

        let token_data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            debug!("JWT validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::expired(),
                ErrorKind::InvalidAudience
                | ErrorKind::InvalidIssuer
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_) => AuthError::invalid_claims(),
                _ => AuthError::unparseable(),
            }
        })?;

        debug!("JWT validated for subject: {}", token_data.claims.sub);
        Ok(token_data.claims)
    }
}
