//! API middleware stack

mod auth;

pub use auth::{extract_bearer_token, AuthContext};

use crate::config::Config;
use crate::error::ApiError;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Apply middleware to a router
pub fn apply_middleware<S>(router: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        // Add timeout
        .layer(TimeoutLayer::new(config.request_timeout()))
        // Wrap bodiless errors, including timeouts, in the JSON error body
        .layer(map_response(json_error_body))
        // Add CORS
        .layer(cors_layer(&config.server.cors_allowed_origins))
        // Add tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Replace error responses that carry no body of their own, such as the
/// router's 405 or the timeout layer's 408, with the JSON error body
async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();
    if !is_error || response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut wrapped = ApiError::Status { status }.into_response();
    if let Some(allow) = allow {
        wrapped.headers_mut().insert(header::ALLOW, allow);
    }
    wrapped
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
