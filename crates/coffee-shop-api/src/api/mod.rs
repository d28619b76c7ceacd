//! API module for the Coffee Shop server

pub mod auth;
pub mod middleware;
pub mod routes;

use crate::server::AppState;
use axum::{
    routing::{get, patch},
    Router,
};
use coffee_shop_common::types;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/drinks",
            get(routes::drinks::list_drinks).post(routes::drinks::create_drink),
        )
        .route("/drinks-detail", get(routes::drinks::drinks_detail))
        .route(
            "/drinks/:id",
            patch(routes::drinks::update_drink).delete(routes::drinks::delete_drink),
        )
        .route("/health", get(routes::health::health_check))
}

/// Create OpenAPI documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::drinks::list_drinks,
        routes::drinks::drinks_detail,
        routes::drinks::create_drink,
        routes::drinks::update_drink,
        routes::drinks::delete_drink,
        routes::health::health_check,
    ),
    components(schemas(
        types::RecipePart,
        types::ShortRecipePart,
        types::Drink,
        types::DrinkShort,
        types::RecipeInput,
        types::DrinkPayload,
        types::DrinkListResponse,
        types::DrinkDetailResponse,
        types::DeleteResponse,
        types::HealthResponse,
        types::ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "drinks", description = "Drink menu"),
        (name = "health", description = "Health and monitoring"),
    ),
    info(
        title = "Coffee Shop API",
        version = "0.1.0",
        description = "Drinks menu for the Coffee Shop, protected by Auth0 RBAC",
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
