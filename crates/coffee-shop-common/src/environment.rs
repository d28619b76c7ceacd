//! Front-end environment record
//!
//! The environment names the API server a client talks to and the Auth0
//! tenant it signs in against. Its wire shape is fixed:
//!
//! ```json
//! {
//!   "production": false,
//!   "apiServerUrl": "http://127.0.0.1:5000",
//!   "auth0": {
//!     "url": "dev-0m5bkb0u.us",
//!     "audience": "drink",
//!     "clientId": "jOpaONBsN7g8VdyZW441lqCZgM6tGDxk",
//!     "callbackURL": "http://localhost:8100"
//!   }
//! }
//! ```
//!
//! Both nested and top-level records reject unknown keys, so a loaded record
//! always carries exactly these six fields.

use crate::error::EnvironmentError;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Prefix for environment variable overrides (e.g. `COFFEE_SHOP_ENV_AUTH0__AUDIENCE`)
pub const ENV_PREFIX: &str = "COFFEE_SHOP_ENV_";

/// Suffix Auth0 appends to a tenant prefix to form its domain
pub const AUTH0_DOMAIN_SUFFIX: &str = ".auth0.com";

/// Typed front-end environment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Environment {
    /// Build-mode flag
    pub production: bool,

    /// Base URL of the running API server
    pub api_server_url: String,

    /// Identity-provider settings
    pub auth0: Auth0Settings,
}

/// Auth0 tenant parameters used by the sign-in flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Auth0Settings {
    /// Auth0 domain prefix, e.g. `dev-0m5bkb0u.us`
    pub url: String,

    /// Audience configured for the Auth0 API
    pub audience: String,

    /// Client id generated for the Auth0 application
    #[serde(rename = "clientId")]
    pub client_id: String,

    /// Base URL of the running client application
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self::development()
    }
}

impl Environment {
    /// Development scaffold values
    pub fn development() -> Self {
        Self {
            production: false,
            api_server_url: "http://127.0.0.1:5000".to_string(),
            auth0: Auth0Settings {
                url: "dev-0m5bkb0u.us".to_string(),
                audience: "drink".to_string(),
                client_id: "jOpaONBsN7g8VdyZW441lqCZgM6tGDxk".to_string(),
                callback_url: "http://localhost:8100".to_string(),
            },
        }
    }

    /// Parse the record from its JSON wire shape
    pub fn from_json_str(input: &str) -> Result<Self, EnvironmentError> {
        serde_json::from_str(input).map_err(|e| EnvironmentError::Load {
            details: e.to_string(),
        })
    }

    /// Load the record from a JSON or TOML file, then apply `COFFEE_SHOP_ENV_`
    /// overrides and validate the result.
    ///
    /// A missing file falls back to [`Environment::development`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvironmentError> {
        let path = path.as_ref();

        let figment = if path.exists() {
            debug!("Loading environment from {}", path.display());
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => Figment::from(Toml::file(path)),
                _ => Figment::from(Json::file(path)),
            }
        } else {
            debug!(
                "Environment file {} not found, using development defaults",
                path.display()
            );
            Figment::from(Serialized::defaults(Self::development()))
        };

        let mut environment: Self = figment.extract().map_err(|e| EnvironmentError::Load {
            details: e.to_string(),
        })?;

        environment.apply_env_overrides()?;
        environment.validate()?;

        Ok(environment)
    }

    /// Merge `COFFEE_SHOP_ENV_*` variables into this record.
    ///
    /// Variable names use snake_case with `__` for nesting, e.g.
    /// `COFFEE_SHOP_ENV_API_SERVER_URL` or `COFFEE_SHOP_ENV_AUTH0__CLIENT_ID`.
    pub fn apply_env_overrides(&mut self) -> Result<(), EnvironmentError> {
        let overrides: EnvironmentOverrides = Figment::from(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| EnvironmentError::Load {
                details: e.to_string(),
            })?;

        if let Some(production) = overrides.production {
            self.production = production;
        }
        if let Some(api_server_url) = overrides.api_server_url {
            self.api_server_url = api_server_url;
        }

        let auth0 = overrides.auth0;
        if let Some(url) = auth0.url {
            self.auth0.url = url;
        }
        if let Some(audience) = auth0.audience {
            self.auth0.audience = audience;
        }
        if let Some(client_id) = auth0.client_id {
            self.auth0.client_id = client_id;
        }
        if let Some(callback_url) = auth0.callback_url {
            self.auth0.callback_url = callback_url;
        }

        Ok(())
    }

    /// Check that every field holds a usable value
    pub fn validate(&self) -> Result<(), EnvironmentError> {
        let api_url = parse_http_url("apiServerUrl", &self.api_server_url)?;
        if self.production && api_url.scheme() != "https" {
            return Err(EnvironmentError::invalid(
                "apiServerUrl",
                "production builds must use https",
            ));
        }

        self.auth0.validate()
    }

    /// Render the record as the front-end `environment` module
    pub fn render_module(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "export const environment = {{");
        let _ = writeln!(out, "  production: {},", self.production);
        let _ = writeln!(out, "  apiServerUrl: {},", quote(&self.api_server_url));
        let _ = writeln!(out, "  auth0: {{");
        let _ = writeln!(out, "    url: {},", quote(&self.auth0.url));
        let _ = writeln!(out, "    audience: {},", quote(&self.auth0.audience));
        let _ = writeln!(out, "    clientId: {},", quote(&self.auth0.client_id));
        let _ = writeln!(out, "    callbackURL: {},", quote(&self.auth0.callback_url));
        let _ = writeln!(out, "  }}");
        let _ = writeln!(out, "}};");
        out
    }
}

impl Auth0Settings {
    /// Full tenant domain, e.g. `dev-0m5bkb0u.us.auth0.com`
    pub fn domain(&self) -> String {
        tenant_domain(&self.url)
    }

    /// Token issuer for this tenant
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain())
    }

    /// JWKS endpoint for this tenant
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain())
    }

    /// Implicit-flow authorize link. `callback_path` is appended to the
    /// callback URL.
    pub fn login_url(&self, callback_path: &str) -> String {
        let redirect_uri = format!("{}{}", self.callback_url, callback_path);
        format!(
            "https://{}/authorize?audience={}&response_type=token&client_id={}&redirect_uri={}",
            self.domain(),
            urlencoding::encode(&self.audience),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
        )
    }

    /// Logout link returning to the callback URL
    pub fn logout_url(&self) -> String {
        format!(
            "https://{}/v2/logout?client_id={}&returnTo={}",
            self.domain(),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
        )
    }

    fn validate(&self) -> Result<(), EnvironmentError> {
        if self.url.trim().is_empty() {
            return Err(EnvironmentError::invalid("auth0.url", "must not be empty"));
        }
        if self.url.contains("://") || self.url.contains('/') {
            return Err(EnvironmentError::invalid(
                "auth0.url",
                "must be a bare domain prefix without scheme or path",
            ));
        }
        if self.audience.trim().is_empty() {
            return Err(EnvironmentError::invalid(
                "auth0.audience",
                "must not be empty",
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(EnvironmentError::invalid(
                "auth0.clientId",
                "must not be empty",
            ));
        }
        parse_http_url("auth0.callbackURL", &self.callback_url)?;
        Ok(())
    }
}

/// Expand a tenant prefix into its Auth0 domain. Full domains pass through.
pub fn tenant_domain(prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.ends_with(AUTH0_DOMAIN_SUFFIX) {
        prefix.to_string()
    } else {
        format!("{prefix}{AUTH0_DOMAIN_SUFFIX}")
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, EnvironmentError> {
    let url = Url::parse(value).map_err(|e| EnvironmentError::invalid(field, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EnvironmentError::invalid(
            field,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Single-quoted JS string literal
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvironmentOverrides {
    production: Option<bool>,
    api_server_url: Option<String>,
    auth0: Auth0Overrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Auth0Overrides {
    url: Option<String>,
    audience: Option<String>,
    client_id: Option<String>,
    callback_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "production": false,
            "apiServerUrl": "http://127.0.0.1:5000",
            "auth0": {
                "url": "dev-0m5bkb0u.us",
                "audience": "drink",
                "clientId": "jOpaONBsN7g8VdyZW441lqCZgM6tGDxk",
                "callbackURL": "http://localhost:8100"
            }
        })
    }

    #[test]
    fn test_parses_wire_shape() {
        let env = Environment::from_json_str(&sample_json().to_string()).unwrap();
        assert_eq!(env, Environment::development());
    }

    #[test]
    fn test_serializes_exact_field_names() {
        let value = serde_json::to_value(Environment::development()).unwrap();
        assert_eq!(value, sample_json());

        let top: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(top.len(), 3);
        assert_eq!(value["auth0"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut value = sample_json();
        value["auth0"].as_object_mut().unwrap().remove("clientId");
        let err = Environment::from_json_str(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("clientId"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut value = sample_json();
        value["extra"] = json!(true);
        assert!(Environment::from_json_str(&value.to_string()).is_err());

        let mut nested = sample_json();
        nested["auth0"]["domain"] = json!("x");
        assert!(Environment::from_json_str(&nested.to_string()).is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let mut value = sample_json();
        value["production"] = json!("false");
        assert!(Environment::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn test_tenant_derivations() {
        let auth0 = Environment::development().auth0;
        assert_eq!(auth0.domain(), "dev-0m5bkb0u.us.auth0.com");
        assert_eq!(auth0.issuer(), "https://dev-0m5bkb0u.us.auth0.com/");
        assert_eq!(
            auth0.jwks_url(),
            "https://dev-0m5bkb0u.us.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(tenant_domain("acme.eu.auth0.com"), "acme.eu.auth0.com");
    }

    #[test]
    fn test_login_url() {
        let auth0 = Environment::development().auth0;
        assert_eq!(
            auth0.login_url("/tabs/user-page"),
            "https://dev-0m5bkb0u.us.auth0.com/authorize?audience=drink&response_type=token\
             &client_id=jOpaONBsN7g8VdyZW441lqCZgM6tGDxk\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8100%2Ftabs%2Fuser-page"
        );
    }

    #[test]
    fn test_logout_url() {
        let auth0 = Environment::development().auth0;
        assert!(auth0
            .logout_url()
            .ends_with("returnTo=http%3A%2F%2Flocalhost%3A8100"));
    }

    #[test]
    fn test_validation() {
        assert!(Environment::development().validate().is_ok());

        let mut env = Environment::development();
        env.api_server_url = "not a url".to_string();
        assert!(matches!(
            env.validate(),
            Err(EnvironmentError::InvalidField {
                field: "apiServerUrl",
                ..
            })
        ));

        let mut env = Environment::development();
        env.production = true;
        assert!(env.validate().is_err());
        env.api_server_url = "https://api.coffee.example".to_string();
        assert!(env.validate().is_ok());

        let mut env = Environment::development();
        env.auth0.url = "https://dev-0m5bkb0u.us.auth0.com".to_string();
        assert!(env.validate().is_err());

        let mut env = Environment::development();
        env.auth0.audience = " ".to_string();
        assert!(env.validate().is_err());

        let mut env = Environment::development();
        env.auth0.callback_url = "ftp://localhost".to_string();
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_render_module() {
        let module = Environment::development().render_module();
        assert!(module.starts_with("export const environment = {"));
        assert!(module.contains("  production: false,"));
        assert!(module.contains("  apiServerUrl: 'http://127.0.0.1:5000',"));
        assert!(module.contains("    clientId: 'jOpaONBsN7g8VdyZW441lqCZgM6tGDxk',"));
        assert!(module.contains("    callbackURL: 'http://localhost:8100',"));
        assert!(module.trim_end().ends_with("};"));
    }

    #[test]
    fn test_render_module_escapes_line_breaks() {
        let mut env = Environment::development();
        env.auth0.audience = "drink\nexport const leaked = 1;".to_string();
        env.auth0.client_id = "it's\r\u{0}".to_string();

        let module = env.render_module();
        assert!(module.contains(r"    audience: 'drink\nexport const leaked = 1;',"));
        assert!(module.contains(r"    clientId: 'it\'s\r\u0000',"));
        assert!(!module.contains("\nexport const leaked"));
    }

    #[test]
    fn test_load_json_file_with_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("environment.json", &sample_json().to_string())?;
            jail.set_env("COFFEE_SHOP_ENV_API_SERVER_URL", "http://10.0.0.2:5000");
            jail.set_env("COFFEE_SHOP_ENV_AUTH0__CLIENT_ID", "override-client");

            let env = Environment::load("environment.json").expect("load");
            assert_eq!(env.api_server_url, "http://10.0.0.2:5000");
            assert_eq!(env.auth0.client_id, "override-client");
            assert_eq!(env.auth0.audience, "drink");
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "environment.toml",
                r#"
                production = true
                apiServerUrl = "https://api.coffee.example"

                [auth0]
                url = "coffee.eu"
                audience = "drink"
                clientId = "abc"
                callbackURL = "https://coffee.example"
                "#,
            )?;

            let env = Environment::load("environment.toml").expect("load");
            assert!(env.production);
            assert_eq!(env.auth0.domain(), "coffee.eu.auth0.com");
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_file_uses_development_defaults() {
        Jail::expect_with(|_jail| {
            let env = Environment::load("missing.json").expect("load");
            assert_eq!(env, Environment::development());
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_override() {
        Jail::expect_with(|jail| {
            jail.set_env("COFFEE_SHOP_ENV_PRODUCTION", "true");
            let err = Environment::load("missing.json").unwrap_err();
            assert!(matches!(err, EnvironmentError::InvalidField { .. }));
            Ok(())
        });
    }
}
