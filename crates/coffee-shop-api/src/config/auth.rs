//! Authentication configuration

use coffee_shop_common::environment::tenant_domain;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auth0 token validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Auth0 tenant prefix (`dev-0m5bkb0u.us`) or full domain
    pub tenant: String,

    /// Audience tokens must be issued for
    pub audience: String,

    /// JWKS endpoint override. Defaults to the tenant's well-known JWKS.
    pub jwks_url: Option<String>,

    /// Issuer override. Defaults to `https://<tenant domain>/`.
    pub issuer: Option<String>,

    /// JWKS cache TTL in seconds
    pub jwks_cache_ttl: u64,

    /// Allowed clock skew for JWT validation in seconds
    pub allowed_clock_skew: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tenant: "dev-0m5bkb0u.us".to_string(),
            audience: "drink".to_string(),
            jwks_url: None,
            issuer: None,
            jwks_cache_ttl: 3600,
            allowed_clock_skew: 60,
        }
    }
}

impl AuthConfig {
    pub fn domain(&self) -> String {
        tenant_domain(&self.tenant)
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", self.domain()))
    }

    pub fn issuer(&self) -> String {
        self.issuer
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.domain()))
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl)
    }

    pub fn allowed_clock_skew(&self) -> Duration {
        Duration::from_secs(self.allowed_clock_skew)
    }
}
