//! Configuration module for the Coffee Shop API

mod auth;
mod server;

pub use auth::AuthConfig;
pub use server::ServerConfig;

use coffee_shop_common::{Auth0Settings, ConfigurationError as ConfigError, Environment};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "coffee-shop-api.toml";

/// Prefix for environment overrides (e.g. `COFFEE_SHOP_API_SERVER__BIND_ADDRESS`)
pub const ENV_PREFIX: &str = "COFFEE_SHOP_API_";

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite:coffee_shop.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Drop and recreate the schema on startup, seeding the default drink.
    /// Destroys all stored drinks.
    pub reset_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:coffee_shop.db".to_string(),
            max_connections: 5,
            reset_on_startup: false,
        }
    }
}

/// Public settings handed to the front-end through the generated environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Client id generated for the Auth0 application
    pub client_id: String,

    /// Base URL of the running client application
    pub callback_url: String,

    /// URL clients use to reach this server. Defaults to `http://<bind_address>`.
    pub public_api_url: Option<String>,

    /// Whether the generated environment is a production build
    pub production: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: "jOpaONBsN7g8VdyZW441lqCZgM6tGDxk".to_string(),
            callback_url: "http://localhost:8100".to_string(),
            public_api_url: None,
            production: false,
        }
    }
}

/// Main configuration structure for the Coffee Shop API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Auth0 validation configuration
    pub auth: AuthConfig,

    /// Front-end environment settings
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from defaults, then the TOML file, then environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract().map_err(|e| ConfigError::ParseError {
            details: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Generate example configuration file
    pub fn generate_example() -> Result<String, ConfigError> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }

    /// Check values that figment cannot check by type alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout == 0 {
            return Err(invalid("server.request_timeout", "must be greater than 0"));
        }
        if self.database.url.trim().is_empty() {
            return Err(invalid("database.url", "must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be greater than 0"));
        }
        if self.auth.tenant.trim().is_empty() {
            return Err(invalid("auth.tenant", "must not be empty"));
        }
        if self.auth.audience.trim().is_empty() {
            return Err(invalid("auth.audience", "must not be empty"));
        }

        self.to_environment().validate()?;
        Ok(())
    }

    /// Build the front-end environment record describing this deployment
    pub fn to_environment(&self) -> Environment {
        let api_server_url = self
            .client
            .public_api_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.server.bind_address));

        Environment {
            production: self.client.production,
            api_server_url,
            auth0: Auth0Settings {
                url: self.auth.tenant.clone(),
                audience: self.auth.audience.clone(),
                client_id: self.client.client_id.clone(),
                callback_url: self.client.callback_url.clone(),
            },
        }
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 5000);
        assert_eq!(config.auth.audience, "drink");
        assert!(!config.database.reset_on_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let serialized = Config::generate_example().unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(
            Config::default().server.bind_address,
            deserialized.server.bind_address
        );
        assert_eq!(Config::default().auth.tenant, deserialized.auth.tenant);
    }

    #[test]
    fn test_duration_conversions() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.jwks_cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.auth.allowed_clock_skew(), Duration::from_secs(60));
    }

    #[test]
    fn test_to_environment_matches_development_scaffold() {
        assert_eq!(Config::default().to_environment(), Environment::development());
    }

    #[test]
    fn test_to_environment_prefers_public_url() {
        let mut config = Config::default();
        config.client.public_api_url = Some("https://api.coffee.example".to_string());
        config.client.production = true;

        let env = config.to_environment();
        assert_eq!(env.api_server_url, "https://api.coffee.example");
        assert!(env.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.auth.audience = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = Config::default();
        config.client.production = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Environment(_))
        ));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "coffee-shop-api.toml",
                r#"
                [server]
                bind_address = "0.0.0.0:8080"

                [auth]
                tenant = "coffee.eu"
                "#,
            )?;
            jail.set_env("COFFEE_SHOP_API_AUTH__AUDIENCE", "coffee-api");
            jail.set_env("COFFEE_SHOP_API_DATABASE__RESET_ON_STARTUP", "true");

            let config = Config::load(None).expect("load");
            assert_eq!(config.server.bind_address.port(), 8080);
            assert_eq!(config.auth.tenant, "coffee.eu");
            assert_eq!(config.auth.audience, "coffee-api");
            assert!(config.database.reset_on_startup);
            assert_eq!(config.server.request_timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn test_load_explicit_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Some(Path::new("nope.toml"))).expect("load");
            assert_eq!(config.database.url, "sqlite:coffee_shop.db");
            Ok(())
        });
    }
}
