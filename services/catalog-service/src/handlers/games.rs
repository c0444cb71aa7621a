use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use common::validation::{validate_console, validate_rating, validate_search_term};
use common::{CreateGameRequest, UpdateGameRequest};

use crate::error::ApiError;
use crate::extract::{EntityId, JsonBody};
use crate::projection::{self, GameView};
use crate::state::AppState;
use crate::store::GameFilter;

async fn filtered(state: &AppState, filter: GameFilter) -> Result<Json<Vec<GameView>>, ApiError> {
    let games = state.catalog().list_games(&filter).await?;
    Ok(Json(projection::game_views(state.catalog(), games).await?))
}

/// GET /games
pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<GameView>>, ApiError> {
    filtered(&state, GameFilter::All).await
}

/// GET /games/{id}
pub async fn get_game(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<GameView>, ApiError> {
    let game = state
        .catalog()
        .get_game(id)
        .await?
        .ok_or(ApiError::not_found("Game"))?;
    Ok(Json(projection::game_view(state.catalog(), game).await?))
}

/// POST /games
pub async fn create_game(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let new_game = req.validate()?;
    let game = state
        .catalog()
        .insert_game(new_game)
        .await
        .map_err(ApiError::storage("add game to database"))?;

    tracing::info!(game_id = game.id, title = %game.title, "game created");
    let view = projection::game_view(state.catalog(), game).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /games/{id}
pub async fn update_game(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(req): JsonBody<UpdateGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let patch = req.validate()?;
    let game = state
        .catalog()
        .update_game(id, patch)
        .await
        .map_err(ApiError::storage("update game"))?
        .ok_or(ApiError::not_found("Game"))?;

    tracing::info!(game_id = game.id, "game updated");
    let view = projection::game_view(state.catalog(), game).await?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// DELETE /games/{id} - also removes the game's listings
pub async fn delete_game(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .catalog()
        .delete_game(id)
        .await
        .map_err(ApiError::storage("delete game"))?;
    if !deleted {
        return Err(ApiError::not_found("Game"));
    }

    tracing::info!(game_id = id, "game deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /games/console/{console}
pub async fn games_by_console(
    State(state): State<AppState>,
    Path(console): Path<String>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let console = validate_console(&console)?;
    filtered(&state, GameFilter::Console(console)).await
}

/// GET /games/rating/{rating}
pub async fn games_by_rating(
    State(state): State<AppState>,
    Path(rating): Path<String>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let rating = validate_rating(&rating)?;
    filtered(&state, GameFilter::Rating(rating)).await
}

/// GET /games/genre/{genre}
pub async fn games_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let genre = validate_search_term("genre", &genre)?;
    filtered(&state, GameFilter::Genre(genre)).await
}
