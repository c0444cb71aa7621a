//! Request handlers, one module per entity.

pub mod games;
pub mod listings;
pub mod stores;

use axum::response::Html;

/// GET / - static greeting
pub async fn index() -> Html<&'static str> {
    Html("<h1>Game Catalog Server</h1>")
}
