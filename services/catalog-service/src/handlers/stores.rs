use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use common::validation::validate_search_term;
use common::{CreateStoreRequest, UpdateStoreRequest};

use crate::error::ApiError;
use crate::extract::{EntityId, JsonBody};
use crate::projection::{self, StoreView};
use crate::state::AppState;
use crate::store::StoreFilter;

async fn filtered(
    state: &AppState,
    filter: StoreFilter,
) -> Result<Json<Vec<StoreView>>, ApiError> {
    let stores = state.catalog().list_stores(&filter).await?;
    Ok(Json(projection::store_views(state.catalog(), stores).await?))
}

/// GET /stores
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<Vec<StoreView>>, ApiError> {
    filtered(&state, StoreFilter::All).await
}

/// GET /stores/{id}
pub async fn get_store(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<StoreView>, ApiError> {
    let store = state
        .catalog()
        .get_store(id)
        .await?
        .ok_or(ApiError::not_found("Store"))?;
    Ok(Json(projection::store_view(state.catalog(), store).await?))
}

/// POST /stores
pub async fn create_store(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreView>), ApiError> {
    let new_store = req.validate()?;
    let store = state
        .catalog()
        .insert_store(new_store)
        .await
        .map_err(ApiError::storage("add store to database"))?;

    tracing::info!(store_id = store.id, name = %store.name, "store created");
    let view = projection::store_view(state.catalog(), store).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /stores/{id}
pub async fn update_store(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(req): JsonBody<UpdateStoreRequest>,
) -> Result<(StatusCode, Json<StoreView>), ApiError> {
    let patch = req.validate()?;
    let store = state
        .catalog()
        .update_store(id, patch)
        .await
        .map_err(ApiError::storage("update store"))?
        .ok_or(ApiError::not_found("Store"))?;

    tracing::info!(store_id = store.id, "store updated");
    let view = projection::store_view(state.catalog(), store).await?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// DELETE /stores/{id} - also removes the store's listings
pub async fn delete_store(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .catalog()
        .delete_store(id)
        .await
        .map_err(ApiError::storage("delete store"))?;
    if !deleted {
        return Err(ApiError::not_found("Store"));
    }

    tracing::info!(store_id = id, "store deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /stores/name/{name}
pub async fn stores_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<StoreView>>, ApiError> {
    let name = validate_search_term("name", &name)?;
    filtered(&state, StoreFilter::Name(name)).await
}

/// GET /stores/location/{location}
pub async fn stores_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Vec<StoreView>>, ApiError> {
    let location = validate_search_term("location", &location)?;
    filtered(&state, StoreFilter::Location(location)).await
}
