//! Drink menu route handlers

use crate::{
    api::middleware::AuthContext,
    error::{ApiError, Result},
    server::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use coffee_shop_common::{
    permissions,
    types::{
        DeleteResponse, Drink, DrinkDetailResponse, DrinkListResponse, DrinkPayload, ErrorBody,
    },
};
use tracing::{debug, info, instrument};

/// List drinks with the public (short) recipe representation
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "Drinks on the menu", body = DrinkListResponse),
        (status = 404, description = "The menu is empty", body = ErrorBody)
    ),
    tag = "drinks"
)]
#[instrument(skip(state))]
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<DrinkListResponse>> {
    let drinks = state.db.drinks().list().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("drinks"));
    }

    Ok(Json(DrinkListResponse {
        success: true,
        drinks: drinks.iter().map(Drink::short).collect(),
    }))
}

/// List drinks with full recipes
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "Drinks with ingredient names", body = DrinkDetailResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "The menu is empty", body = ErrorBody)
    ),
    tag = "drinks",
    security(("bearer_auth" = ["get:drinks-detail"]))
)]
#[instrument(skip(state, auth), fields(sub = %auth.subject()))]
pub async fn drinks_detail(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DrinkDetailResponse>> {
    auth.require_permission(permissions::GET_DRINKS_DETAIL)?;

    let drinks = state.db.drinks().list().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("drinks"));
    }

    Ok(Json(DrinkDetailResponse {
        success: true,
        drinks: drinks.iter().map(Drink::long).collect(),
    }))
}

/// Add a drink to the menu
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = DrinkPayload,
    responses(
        (status = 200, description = "The created drink", body = DrinkDetailResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 422, description = "Invalid drink or duplicate title", body = ErrorBody)
    ),
    tag = "drinks",
    security(("bearer_auth" = ["post:drinks"]))
)]
#[instrument(skip(state, auth, payload), fields(sub = %auth.subject()))]
pub async fn create_drink(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: std::result::Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinkDetailResponse>> {
    auth.require_permission(permissions::POST_DRINKS)?;

    let Json(payload) = payload.map_err(reject_body)?;
    let new_drink = payload.validate_new()?;

    let drink = state.db.drinks().insert(&new_drink).await?;
    info!("Created drink {} ({})", drink.id, drink.title);

    Ok(Json(DrinkDetailResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

/// Update the title and/or recipe of a drink
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink id")),
    request_body = DrinkPayload,
    responses(
        (status = 200, description = "The updated drink", body = DrinkDetailResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "No drink with this id", body = ErrorBody),
        (status = 422, description = "Invalid changes or duplicate title", body = ErrorBody)
    ),
    tag = "drinks",
    security(("bearer_auth" = ["patch:drinks"]))
)]
#[instrument(skip(state, auth, id, payload), fields(sub = %auth.subject()))]
pub async fn update_drink(
    State(state): State<AppState>,
    auth: AuthContext,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinkDetailResponse>> {
    auth.require_permission(permissions::PATCH_DRINKS)?;

    let id = drink_id(id)?;
    let Json(payload) = payload.map_err(reject_body)?;
    let changes = payload.validate_update()?;

    let drink = state
        .db
        .drinks()
        .update(id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("drink {id}")))?;
    info!("Updated drink {}", drink.id);

    Ok(Json(DrinkDetailResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

/// Remove a drink from the menu
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink id")),
    responses(
        (status = 200, description = "Id of the removed drink", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "No drink with this id", body = ErrorBody)
    ),
    tag = "drinks",
    security(("bearer_auth" = ["delete:drinks"]))
)]
#[instrument(skip(state, auth, id), fields(sub = %auth.subject()))]
pub async fn delete_drink(
    State(state): State<AppState>,
    auth: AuthContext,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    auth.require_permission(permissions::DELETE_DRINKS)?;

    let id = drink_id(id)?;
    if !state.db.drinks().delete(id).await? {
        return Err(ApiError::not_found(format!("drink {id}")));
    }
    info!("Deleted drink {}", id);

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

/// Ids that are not integers cannot name a drink
fn drink_id(id: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    id.map(|Path(id)| id).map_err(|e| {
        debug!("Rejected drink id: {}", e);
        ApiError::not_found("drink")
    })
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {}", rejection);
    ApiError::unprocessable(rejection.body_text())
}
