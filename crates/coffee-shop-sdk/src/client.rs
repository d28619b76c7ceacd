//! HTTP client for the Coffee Shop API
//!
//! Public routes work without a token. Protected routes need an Auth0 access
//! token, sent as `Authorization: Bearer {token}`.
//!
//! ```rust,no_run
//! use coffee_shop_common::Environment;
//! use coffee_shop_sdk::ClientBuilder;
//!
//! # async fn example() -> coffee_shop_sdk::Result<()> {
//! let env = Environment::development();
//! let client = ClientBuilder::from_environment(&env)
//!     .bearer_token("eyJhbGciOi...")
//!     .build()?;
//!
//! for drink in client.drinks_detail().await? {
//!     println!("{}: {} parts", drink.title, drink.recipe.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SdkError};
use coffee_shop_common::{
    types::{
        DeleteResponse, Drink, DrinkDetailResponse, DrinkListResponse, DrinkPayload, DrinkShort,
        ErrorBody, HealthResponse,
    },
    Environment,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API URL when not specified
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for interacting with the Coffee Shop API
#[derive(Debug, Clone)]
pub struct CoffeeShopClient {
    http_client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl CoffeeShopClient {
    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the access token, e.g. after signing in again
    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    // ===== Drinks =====

    /// Public drink listing. An empty menu yields an empty list.
    pub async fn list_drinks(&self) -> Result<Vec<DrinkShort>> {
        match self.get::<DrinkListResponse>("/drinks").await {
            Ok(response) => Ok(response.drinks),
            Err(SdkError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Drinks with full recipes. Requires `get:drinks-detail`.
    pub async fn drinks_detail(&self) -> Result<Vec<Drink>> {
        match self.get::<DrinkDetailResponse>("/drinks-detail").await {
            Ok(response) => Ok(response.drinks),
            Err(SdkError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Create a drink. Requires `post:drinks`.
    pub async fn create_drink(&self, payload: &DrinkPayload) -> Result<Drink> {
        let response: DrinkDetailResponse = self.send(Method::POST, "/drinks", Some(payload)).await?;
        single_drink(response)
    }

    /// Update a drink. Requires `patch:drinks`.
    pub async fn update_drink(&self, id: i64, payload: &DrinkPayload) -> Result<Drink> {
        let path = format!("/drinks/{id}");
        let response: DrinkDetailResponse = self.send(Method::PATCH, &path, Some(payload)).await?;
        single_drink(response)
    }

    /// Delete a drink, returning its id. Requires `delete:drinks`.
    pub async fn delete_drink(&self, id: i64) -> Result<i64> {
        let path = format!("/drinks/{id}");
        let response: DeleteResponse = self.send::<(), _>(Method::DELETE, &path, None).await?;
        Ok(response.delete)
    }

    // ===== Health =====

    /// Health check
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    // ===== Private Helper Methods =====

    /// Apply authentication to request
    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Generic GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.apply_auth(self.http_client.request(method, &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Handle successful response
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

fn single_drink(response: DrinkDetailResponse) -> Result<Drink> {
    response
        .drinks
        .into_iter()
        .next()
        .ok_or_else(|| SdkError::Internal {
            message: "Response contained no drink".into(),
        })
}

/// Map an error response back into an [`SdkError`]
async fn error_from_response(response: Response) -> SdkError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();

    let Ok(body) = serde_json::from_str::<ErrorBody>(&error_text) else {
        return error_from_status(status, error_text);
    };

    // Authentication failures carry {code, description}
    if let Some(object) = body.message.as_object() {
        let field = |name: &str| {
            object
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let (code, description) = (field("code"), field("description"));

        if status == StatusCode::FORBIDDEN {
            return SdkError::Authorization { description };
        }
        if code == "authorization_header_missing" {
            return SdkError::MissingAuthentication { description };
        }
        return SdkError::Authentication { code, description };
    }

    let message = body.message.as_str().unwrap_or_default().to_string();
    error_from_status(status, message)
}

fn error_from_status(status: StatusCode, message: String) -> SdkError {
    match status {
        StatusCode::UNAUTHORIZED => SdkError::Authentication {
            code: "unauthorized".into(),
            description: message,
        },
        StatusCode::FORBIDDEN => SdkError::Authorization {
            description: message,
        },
        StatusCode::NOT_FOUND => SdkError::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => SdkError::Unprocessable,
        StatusCode::BAD_REQUEST => SdkError::BadRequest { message },
        StatusCode::SERVICE_UNAVAILABLE => SdkError::ServiceUnavailable,
        _ => SdkError::Internal {
            message: format!("Request failed with status {status}: {message}"),
        },
    }
}

/// Builder for constructing a CoffeeShopClient with custom configuration
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pointed at the environment's API server
    pub fn from_environment(env: &Environment) -> Self {
        Self::new().base_url(env.api_server_url.clone())
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the Auth0 access token sent with every request
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CoffeeShopClient> {
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let parsed = url::Url::parse(&base_url).map_err(|e| SdkError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SdkError::InvalidUrl {
                url: base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(CoffeeShopClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: self.bearer_token,
        })
    }
}
