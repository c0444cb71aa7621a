//! PostgreSQL catalog backend.
//!
//! Schema lives in `migrations/`. Listings reference games and stores with
//! `ON DELETE CASCADE`, so deleting a parent is a single statement.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use common::{Game, GamePatch, Listing, ListingPatch, NewGame, NewListing, NewStore, Store, StorePatch};

use crate::models::{DbCondition, DbGame, DbListing, DbRating, DbStore};
use crate::store::{CatalogStore, GameFilter, ListingFilter, StoreError, StoreFilter};

const GAME_COLUMNS: &str = "id, title, rating, console, genre, image";
const STORE_COLUMNS: &str = "id, name, location, hours";
const LISTING_COLUMNS: &str = "id, price, stock, condition, created_at, game_id, store_id";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Map a unique violation on `field` to a duplicate error.
fn write_error(err: sqlx::Error, field: &'static str, value: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate {
            field,
            value: value.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

/// Map a foreign-key violation on `listings` to the parent that is missing.
fn reference_error(err: sqlx::Error, game_id: i32, store_id: i32) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            match db_err.constraint() {
                Some(constraint) if constraint.contains("store_id") => {
                    StoreError::MissingReference {
                        resource: "Store",
                        id: store_id,
                    }
                }
                _ => StoreError::MissingReference {
                    resource: "Game",
                    id: game_id,
                },
            }
        }
        _ => StoreError::Database(err),
    }
}

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = create_pool(database_url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, StoreError> {
        let rows: Vec<DbGame> = match filter {
            GameFilter::All => {
                sqlx::query_as(&format!("SELECT {GAME_COLUMNS} FROM games ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
            GameFilter::Console(console) => {
                // a scalar console or a list containing it
                sqlx::query_as(&format!(
                    "SELECT {GAME_COLUMNS} FROM games
                     WHERE console = to_jsonb($1::text) OR console @> jsonb_build_array($1::text)
                     ORDER BY id"
                ))
                .bind(console.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            GameFilter::Rating(rating) => {
                sqlx::query_as(&format!(
                    "SELECT {GAME_COLUMNS} FROM games WHERE rating = $1 ORDER BY id"
                ))
                .bind(DbRating::from(*rating))
                .fetch_all(&self.pool)
                .await?
            }
            GameFilter::Genre(genre) => {
                sqlx::query_as(&format!(
                    "SELECT {GAME_COLUMNS} FROM games
                     WHERE strpos(lower(genre), lower($1)) > 0
                     ORDER BY id"
                ))
                .bind(genre)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn get_game(&self, id: i32) -> Result<Option<Game>, StoreError> {
        let row: Option<DbGame> =
            sqlx::query_as(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Game::from))
    }

    async fn games_by_ids(&self, ids: &[i32]) -> Result<Vec<Game>, StoreError> {
        let rows: Vec<DbGame> = sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn insert_game(&self, game: NewGame) -> Result<Game, StoreError> {
        let row: DbGame = sqlx::query_as(&format!(
            "INSERT INTO games (title, rating, console, genre, image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {GAME_COLUMNS}"
        ))
        .bind(&game.title)
        .bind(DbRating::from(game.rating))
        .bind(Json(&game.console))
        .bind(&game.genre)
        .bind(&game.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "title", &game.title))?;
        Ok(row.into())
    }

    async fn update_game(&self, id: i32, patch: GamePatch) -> Result<Option<Game>, StoreError> {
        let title = patch.title.clone().unwrap_or_default();
        let row: Option<DbGame> = sqlx::query_as(&format!(
            "UPDATE games
             SET
                 title = COALESCE($2, title),
                 rating = COALESCE($3, rating),
                 console = COALESCE($4, console),
                 genre = COALESCE($5, genre),
                 image = COALESCE($6, image)
             WHERE id = $1
             RETURNING {GAME_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.rating.map(DbRating::from))
        .bind(patch.console.map(Json))
        .bind(patch.genre)
        .bind(patch.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "title", &title))?;
        Ok(row.map(Game::from))
    }

    async fn delete_game(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn game_exists(&self, id: i32) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, StoreError> {
        let (clause, needle) = match filter {
            StoreFilter::All => ("TRUE", None),
            StoreFilter::Name(name) => ("strpos(lower(name), lower($1)) > 0", Some(name)),
            StoreFilter::Location(location) => {
                ("strpos(lower(location), lower($1)) > 0", Some(location))
            }
        };
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE {clause} ORDER BY id");

        let mut query = sqlx::query_as::<_, DbStore>(&sql);
        if let Some(needle) = needle {
            query = query.bind(needle);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn get_store(&self, id: i32) -> Result<Option<Store>, StoreError> {
        let row: Option<DbStore> =
            sqlx::query_as(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Store::from))
    }

    async fn stores_by_ids(&self, ids: &[i32]) -> Result<Vec<Store>, StoreError> {
        let rows: Vec<DbStore> = sqlx::query_as(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn insert_store(&self, store: NewStore) -> Result<Store, StoreError> {
        let row: DbStore = sqlx::query_as(&format!(
            "INSERT INTO stores (name, location, hours)
             VALUES ($1, $2, $3)
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(&store.name)
        .bind(&store.location)
        .bind(&store.hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "name", &store.name))?;
        Ok(row.into())
    }

    async fn update_store(
        &self,
        id: i32,
        patch: StorePatch,
    ) -> Result<Option<Store>, StoreError> {
        let name = patch.name.clone().unwrap_or_default();
        let row: Option<DbStore> = sqlx::query_as(&format!(
            "UPDATE stores
             SET
                 name = COALESCE($2, name),
                 location = COALESCE($3, location),
                 hours = COALESCE($4, hours)
             WHERE id = $1
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.location)
        .bind(patch.hours)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "name", &name))?;
        Ok(row.map(Store::from))
    }

    async fn delete_store(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_exists(&self, id: i32) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn list_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let rows: Vec<DbListing> = match filter {
            ListingFilter::All => {
                sqlx::query_as(&format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
            ListingFilter::Condition(condition) => {
                sqlx::query_as(&format!(
                    "SELECT {LISTING_COLUMNS} FROM listings WHERE condition = $1 ORDER BY id"
                ))
                .bind(DbCondition::from(*condition))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn get_listing(&self, id: i32) -> Result<Option<Listing>, StoreError> {
        let row: Option<DbListing> =
            sqlx::query_as(&format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Listing::from))
    }

    async fn listings_for_games(&self, game_ids: &[i32]) -> Result<Vec<Listing>, StoreError> {
        let rows: Vec<DbListing> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE game_id = ANY($1) ORDER BY id"
        ))
        .bind(game_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn listings_for_stores(&self, store_ids: &[i32]) -> Result<Vec<Listing>, StoreError> {
        let rows: Vec<DbListing> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE store_id = ANY($1) ORDER BY id"
        ))
        .bind(store_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let row: DbListing = sqlx::query_as(&format!(
            "INSERT INTO listings (price, stock, condition, game_id, store_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LISTING_COLUMNS}"
        ))
        .bind(listing.price)
        .bind(listing.stock)
        .bind(DbCondition::from(listing.condition))
        .bind(listing.game_id)
        .bind(listing.store_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error(e, listing.game_id, listing.store_id))?;
        Ok(row.into())
    }

    async fn update_listing(
        &self,
        id: i32,
        patch: ListingPatch,
    ) -> Result<Option<Listing>, StoreError> {
        let (game_id, store_id) = (
            patch.game_id.unwrap_or_default(),
            patch.store_id.unwrap_or_default(),
        );
        let row: Option<DbListing> = sqlx::query_as(&format!(
            "UPDATE listings
             SET
                 price = COALESCE($2, price),
                 stock = COALESCE($3, stock),
                 condition = COALESCE($4, condition),
                 game_id = COALESCE($5, game_id),
                 store_id = COALESCE($6, store_id)
             WHERE id = $1
             RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.condition.map(DbCondition::from))
        .bind(patch.game_id)
        .bind(patch.store_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| reference_error(e, game_id, store_id))?;
        Ok(row.map(Listing::from))
    }

    async fn delete_listing(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("TRUNCATE listings, games, stores RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Condition, Console, Consoles, Rating};
    use rust_decimal::Decimal;

    // Run with: DATABASE_URL=postgres://... cargo test -p catalog-service -- --ignored
    async fn catalog() -> PgCatalog {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let catalog = PgCatalog::connect(&url, 2).await.expect("connect failed");
        catalog.reset().await.expect("reset failed");
        catalog
    }

    fn new_game(title: &str, console: Consoles) -> NewGame {
        NewGame {
            title: title.into(),
            rating: Rating::E,
            console,
            genre: "Adventure RPG".into(),
            image: "https://example.com/cover.png".into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn cascade_delete_removes_listings() {
        let catalog = catalog().await;
        let game = catalog
            .insert_game(new_game("Kingdom Hearts", Consoles::One(Console::PlayStation)))
            .await
            .unwrap();
        let store = catalog
            .insert_store(NewStore {
                name: "GameStop".into(),
                location: "640 Camino Del Rio N STE 317A".into(),
                hours: "9:00 - 21:00".into(),
            })
            .await
            .unwrap();
        for stock in [1, 2] {
            catalog
                .insert_listing(NewListing {
                    price: Decimal::new(2499, 2),
                    stock,
                    condition: Condition::New,
                    game_id: game.id,
                    store_id: store.id,
                })
                .await
                .unwrap();
        }

        assert!(catalog.delete_game(game.id).await.unwrap());
        assert!(catalog.listings_for_stores(&[store.id]).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn filters_match_the_memory_backend() {
        let catalog = catalog().await;
        catalog
            .insert_game(new_game("Elden Ring", Consoles::Many(vec![Console::Pc, Console::Xbox])))
            .await
            .unwrap();
        catalog
            .insert_game(new_game("Mega Man", Consoles::One(Console::Xbox)))
            .await
            .unwrap();

        let xbox = catalog
            .list_games(&GameFilter::Console(Console::Xbox))
            .await
            .unwrap();
        assert_eq!(xbox.len(), 2);
        assert_eq!(xbox[0].console, Consoles::Many(vec![Console::Pc, Console::Xbox]));

        let rpg = catalog
            .list_games(&GameFilter::Genre("rpg".into()))
            .await
            .unwrap();
        assert_eq!(rpg.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_title_is_classified() {
        let catalog = catalog().await;
        catalog
            .insert_game(new_game("Nioh II", Consoles::One(Console::PlayStation)))
            .await
            .unwrap();
        let err = catalog
            .insert_game(new_game("Nioh II", Consoles::One(Console::PlayStation)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "title", .. }));
    }
}
