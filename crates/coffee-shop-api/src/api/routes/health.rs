//! Health check route

use crate::{
    error::{ApiError, Result},
    server::AppState,
};
use axum::{extract::State, Json};
use coffee_shop_common::types::{ErrorBody, HealthResponse};
use tracing::{error, instrument};

/// Report service health, including database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = ErrorBody)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    if let Err(e) = sqlx::query("SELECT 1").execute(state.db.pool()).await {
        error!("Health check database error: {}", e);
        return Err(ApiError::ServiceUnavailable {
            message: "database unreachable".to_string(),
        });
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    }))
}
