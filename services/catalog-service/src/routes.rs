use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{games, index, listings, stores};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/games", get(games::list_games).post(games::create_game))
        .route(
            "/games/{id}",
            get(games::get_game)
                .patch(games::update_game)
                .delete(games::delete_game),
        )
        .route("/games/console/{console}", get(games::games_by_console))
        .route("/games/rating/{rating}", get(games::games_by_rating))
        .route("/games/genre/{genre}", get(games::games_by_genre))
        .route("/stores", get(stores::list_stores).post(stores::create_store))
        .route(
            "/stores/{id}",
            get(stores::get_store)
                .patch(stores::update_store)
                .delete(stores::delete_store),
        )
        .route("/stores/name/{name}", get(stores::stores_by_name))
        .route("/stores/location/{location}", get(stores::stores_by_location))
        .route(
            "/listings",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/listings/{id}",
            get(listings::get_listing)
                .patch(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route(
            "/listings/condition/{condition}",
            get(listings::listings_by_condition),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
