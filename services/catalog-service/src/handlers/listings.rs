use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use common::validation::validate_condition;
use common::{CreateListingRequest, UpdateListingRequest};

use crate::error::ApiError;
use crate::extract::{EntityId, JsonBody};
use crate::projection::{self, ListingView};
use crate::state::AppState;
use crate::store::ListingFilter;

/// Both parents must exist before a listing may point at them.
async fn ensure_parents(
    state: &AppState,
    game_id: Option<i32>,
    store_id: Option<i32>,
) -> Result<(), ApiError> {
    if let Some(game_id) = game_id {
        if !state.catalog().game_exists(game_id).await? {
            return Err(ApiError::not_found("Game"));
        }
    }
    if let Some(store_id) = store_id {
        if !state.catalog().store_exists(store_id).await? {
            return Err(ApiError::not_found("Store"));
        }
    }
    Ok(())
}

/// GET /listings
pub async fn list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let listings = state.catalog().list_listings(&ListingFilter::All).await?;
    Ok(Json(projection::listing_views(state.catalog(), listings).await?))
}

/// GET /listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ListingView>, ApiError> {
    let listing = state
        .catalog()
        .get_listing(id)
        .await?
        .ok_or(ApiError::not_found("Listing"))?;
    let view = projection::listing_view(state.catalog(), listing)
        .await?
        .ok_or(ApiError::not_found("Listing"))?;
    Ok(Json(view))
}

/// POST /listings
pub async fn create_listing(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingView>), ApiError> {
    let new_listing = req.validate()?;
    ensure_parents(&state, Some(new_listing.game_id), Some(new_listing.store_id)).await?;

    let listing = state
        .catalog()
        .insert_listing(new_listing)
        .await
        .map_err(ApiError::storage("add listing to database"))?;

    tracing::info!(
        listing_id = listing.id,
        game_id = listing.game_id,
        store_id = listing.store_id,
        "listing created"
    );
    let view = projection::listing_view(state.catalog(), listing)
        .await?
        .ok_or(ApiError::not_found("Listing"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /listings/{id}
pub async fn update_listing(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(req): JsonBody<UpdateListingRequest>,
) -> Result<(StatusCode, Json<ListingView>), ApiError> {
    let patch = req.validate()?;
    if state.catalog().get_listing(id).await?.is_none() {
        return Err(ApiError::not_found("Listing"));
    }
    ensure_parents(&state, patch.game_id, patch.store_id).await?;

    let listing = state
        .catalog()
        .update_listing(id, patch)
        .await
        .map_err(ApiError::storage("update listing"))?
        .ok_or(ApiError::not_found("Listing"))?;

    tracing::info!(listing_id = listing.id, "listing updated");
    let view = projection::listing_view(state.catalog(), listing)
        .await?
        .ok_or(ApiError::not_found("Listing"))?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// DELETE /listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .catalog()
        .delete_listing(id)
        .await
        .map_err(ApiError::storage("delete listing"))?;
    if !deleted {
        return Err(ApiError::not_found("Listing"));
    }

    tracing::info!(listing_id = id, "listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /listings/condition/{condition}
pub async fn listings_by_condition(
    State(state): State<AppState>,
    Path(condition): Path<String>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let condition = validate_condition(&condition)?;
    let listings = state
        .catalog()
        .list_listings(&ListingFilter::Condition(condition))
        .await?;
    Ok(Json(projection::listing_views(state.catalog(), listings).await?))
}
