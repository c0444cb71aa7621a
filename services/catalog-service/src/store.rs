//! Data-access seam shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;

use common::{
    Condition, Console, Game, GamePatch, Listing, ListingPatch, NewGame, NewListing, NewStore,
    Rating, Store, StorePatch,
};

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{field} '{value}' already exists")]
    Duplicate { field: &'static str, value: String },

    #[error("{resource} {id} does not exist")]
    MissingReference { resource: &'static str, id: i32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GameFilter {
    #[default]
    All,
    Console(Console),
    Rating(Rating),
    /// Case-insensitive substring match.
    Genre(String),
}

impl GameFilter {
    pub fn matches(&self, game: &Game) -> bool {
        match self {
            Self::All => true,
            Self::Console(console) => game.console.contains(*console),
            Self::Rating(rating) => game.rating == *rating,
            Self::Genre(genre) => contains_ignore_case(&game.genre, genre),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StoreFilter {
    #[default]
    All,
    Name(String),
    Location(String),
}

impl StoreFilter {
    pub fn matches(&self, store: &Store) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => contains_ignore_case(&store.name, name),
            Self::Location(location) => contains_ignore_case(&store.location, location),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListingFilter {
    #[default]
    All,
    Condition(Condition),
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::All => true,
            Self::Condition(condition) => listing.condition == *condition,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Catalog persistence. Every list is ordered by ascending id.
///
/// Deleting a game or a store also deletes every listing that references it.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, StoreError>;
    async fn get_game(&self, id: i32) -> Result<Option<Game>, StoreError>;
    async fn games_by_ids(&self, ids: &[i32]) -> Result<Vec<Game>, StoreError>;
    async fn insert_game(&self, game: NewGame) -> Result<Game, StoreError>;
    /// Returns `None` when no game has this id.
    async fn update_game(&self, id: i32, patch: GamePatch) -> Result<Option<Game>, StoreError>;
    async fn delete_game(&self, id: i32) -> Result<bool, StoreError>;

    async fn game_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.get_game(id).await?.is_some())
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, StoreError>;
    async fn get_store(&self, id: i32) -> Result<Option<Store>, StoreError>;
    async fn stores_by_ids(&self, ids: &[i32]) -> Result<Vec<Store>, StoreError>;
    async fn insert_store(&self, store: NewStore) -> Result<Store, StoreError>;
    async fn update_store(&self, id: i32, patch: StorePatch)
        -> Result<Option<Store>, StoreError>;
    async fn delete_store(&self, id: i32) -> Result<bool, StoreError>;

    async fn store_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.get_store(id).await?.is_some())
    }

    async fn list_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError>;
    async fn get_listing(&self, id: i32) -> Result<Option<Listing>, StoreError>;
    async fn listings_for_games(&self, game_ids: &[i32]) -> Result<Vec<Listing>, StoreError>;
    async fn listings_for_stores(&self, store_ids: &[i32]) -> Result<Vec<Listing>, StoreError>;
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;
    async fn update_listing(
        &self,
        id: i32,
        patch: ListingPatch,
    ) -> Result<Option<Listing>, StoreError>;
    async fn delete_listing(&self, id: i32) -> Result<bool, StoreError>;

    /// Drop every row and restart id generation.
    async fn reset(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Consoles;

    fn game(genre: &str, console: Consoles) -> Game {
        Game {
            id: 1,
            title: "Elden Ring".into(),
            rating: Rating::M,
            console,
            genre: genre.into(),
            image: "img".into(),
        }
    }

    #[test]
    fn genre_filter_is_case_insensitive_substring() {
        let filter = GameFilter::Genre("rpg".into());
        assert!(filter.matches(&game("Action RPG", Consoles::One(Console::Pc))));
        assert!(!filter.matches(&game("Shooter", Consoles::One(Console::Pc))));
    }

    #[test]
    fn console_filter_looks_inside_lists() {
        let filter = GameFilter::Console(Console::Xbox);
        assert!(filter.matches(&game(
            "RPG",
            Consoles::Many(vec![Console::Pc, Console::Xbox])
        )));
        assert!(!filter.matches(&game("RPG", Consoles::One(Console::PlayStation))));
    }

    #[test]
    fn store_filters() {
        let store = Store {
            id: 1,
            name: "GameStop".into(),
            location: "640 Camino Del Rio N, San Diego".into(),
            hours: "9:00 - 21:00".into(),
        };
        assert!(StoreFilter::Name("game".into()).matches(&store));
        assert!(StoreFilter::Location("san diego".into()).matches(&store));
        assert!(!StoreFilter::Location("Houston".into()).matches(&store));
    }
}
