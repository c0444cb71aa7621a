//! In-process catalog backend.
//!
//! Mirrors the constraints of the PostgreSQL schema: unique titles and names,
//! listings must reference existing parents, and removing a parent removes
//! its listings.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use common::{Game, GamePatch, Listing, ListingPatch, NewGame, NewListing, NewStore, Store, StorePatch};

use crate::store::{CatalogStore, GameFilter, ListingFilter, StoreError, StoreFilter};

#[derive(Debug, Default)]
struct Tables {
    games: BTreeMap<i32, Game>,
    stores: BTreeMap<i32, Store>,
    listings: BTreeMap<i32, Listing>,
    last_game_id: i32,
    last_store_id: i32,
    last_listing_id: i32,
}

impl Tables {
    fn check_title(&self, title: &str, except: Option<i32>) -> Result<(), StoreError> {
        let taken = self
            .games
            .values()
            .any(|g| g.title == title && Some(g.id) != except);
        if taken {
            return Err(StoreError::Duplicate {
                field: "title",
                value: title.to_string(),
            });
        }
        Ok(())
    }

    fn check_name(&self, name: &str, except: Option<i32>) -> Result<(), StoreError> {
        let taken = self
            .stores
            .values()
            .any(|s| s.name == name && Some(s.id) != except);
        if taken {
            return Err(StoreError::Duplicate {
                field: "name",
                value: name.to_string(),
            });
        }
        Ok(())
    }

    fn check_parents(&self, game_id: i32, store_id: i32) -> Result<(), StoreError> {
        if !self.games.contains_key(&game_id) {
            return Err(StoreError::MissingReference {
                resource: "Game",
                id: game_id,
            });
        }
        if !self.stores.contains_key(&store_id) {
            return Err(StoreError::MissingReference {
                resource: "Store",
                id: store_id,
            });
        }
        Ok(())
    }
}

/// Catalog kept in memory behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<Tables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pick<T: Clone>(rows: &BTreeMap<i32, T>, ids: &[i32]) -> Vec<T> {
    rows.iter()
        .filter(|(id, _)| ids.contains(id))
        .map(|(_, row)| row.clone())
        .collect()
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .games
            .values()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect())
    }

    async fn get_game(&self, id: i32) -> Result<Option<Game>, StoreError> {
        Ok(self.tables.read().await.games.get(&id).cloned())
    }

    async fn games_by_ids(&self, ids: &[i32]) -> Result<Vec<Game>, StoreError> {
        Ok(pick(&self.tables.read().await.games, ids))
    }

    async fn insert_game(&self, game: NewGame) -> Result<Game, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_title(&game.title, None)?;

        tables.last_game_id += 1;
        let game = Game {
            id: tables.last_game_id,
            title: game.title,
            rating: game.rating,
            console: game.console,
            genre: game.genre,
            image: game.image,
        };
        tables.games.insert(game.id, game.clone());
        Ok(game)
    }

    async fn update_game(&self, id: i32, patch: GamePatch) -> Result<Option<Game>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&id) {
            return Ok(None);
        }
        if let Some(title) = &patch.title {
            tables.check_title(title, Some(id))?;
        }

        Ok(tables.games.get_mut(&id).map(|game| {
            patch.apply(game);
            game.clone()
        }))
    }

    async fn delete_game(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.games.remove(&id).is_none() {
            return Ok(false);
        }
        tables.listings.retain(|_, l| l.game_id != id);
        Ok(true)
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stores
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn get_store(&self, id: i32) -> Result<Option<Store>, StoreError> {
        Ok(self.tables.read().await.stores.get(&id).cloned())
    }

    async fn stores_by_ids(&self, ids: &[i32]) -> Result<Vec<Store>, StoreError> {
        Ok(pick(&self.tables.read().await.stores, ids))
    }

    async fn insert_store(&self, store: NewStore) -> Result<Store, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_name(&store.name, None)?;

        tables.last_store_id += 1;
        let store = Store {
            id: tables.last_store_id,
            name: store.name,
            location: store.location,
            hours: store.hours,
        };
        tables.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn update_store(
        &self,
        id: i32,
        patch: StorePatch,
    ) -> Result<Option<Store>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.stores.contains_key(&id) {
            return Ok(None);
        }
        if let Some(name) = &patch.name {
            tables.check_name(name, Some(id))?;
        }

        Ok(tables.stores.get_mut(&id).map(|store| {
            patch.apply(store);
            store.clone()
        }))
    }

    async fn delete_store(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.stores.remove(&id).is_none() {
            return Ok(false);
        }
        tables.listings.retain(|_, l| l.store_id != id);
        Ok(true)
    }

    async fn list_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn get_listing(&self, id: i32) -> Result<Option<Listing>, StoreError> {
        Ok(self.tables.read().await.listings.get(&id).cloned())
    }

    async fn listings_for_games(&self, game_ids: &[i32]) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .values()
            .filter(|l| game_ids.contains(&l.game_id))
            .cloned()
            .collect())
    }

    async fn listings_for_stores(&self, store_ids: &[i32]) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .values()
            .filter(|l| store_ids.contains(&l.store_id))
            .cloned()
            .collect())
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_parents(listing.game_id, listing.store_id)?;

        tables.last_listing_id += 1;
        let listing = Listing {
            id: tables.last_listing_id,
            price: listing.price,
            stock: listing.stock,
            condition: listing.condition,
            created_at: Utc::now(),
            game_id: listing.game_id,
            store_id: listing.store_id,
        };
        tables.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: i32,
        patch: ListingPatch,
    ) -> Result<Option<Listing>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.listings.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply(&mut updated);
        tables.check_parents(updated.game_id, updated.store_id)?;

        tables.listings.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_listing(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.listings.remove(&id).is_some())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Condition, Console, Consoles, Rating};
    use rust_decimal::Decimal;

    fn new_game(title: &str) -> NewGame {
        NewGame {
            title: title.into(),
            rating: Rating::T,
            console: Consoles::One(Console::PlayStation),
            genre: "Action".into(),
            image: "https://example.com/cover.png".into(),
        }
    }

    fn new_store(name: &str) -> NewStore {
        NewStore {
            name: name.into(),
            location: "3 Mill Creek Dr, Secaucus, NJ 07094".into(),
            hours: "9:00 - 21:00".into(),
        }
    }

    fn new_listing(game_id: i32, store_id: i32) -> NewListing {
        NewListing {
            price: Decimal::new(1999, 2),
            stock: 3,
            condition: Condition::Used,
            game_id,
            store_id,
        }
    }

    #[tokio::test]
    async fn ids_follow_insertion_order() {
        let catalog = MemoryCatalog::new();
        let a = catalog.insert_game(new_game("Mega Man")).await.unwrap();
        let b = catalog.insert_game(new_game("Donkey Kong")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let titles: Vec<_> = catalog
            .list_games(&GameFilter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, ["Mega Man", "Donkey Kong"]);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let catalog = MemoryCatalog::new();
        catalog.insert_game(new_game("Nioh II")).await.unwrap();
        let other = catalog.insert_game(new_game("Elden Ring")).await.unwrap();

        let err = catalog.insert_game(new_game("Nioh II")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "title", .. }));

        let patch = GamePatch {
            title: Some("Nioh II".into()),
            ..Default::default()
        };
        let err = catalog.update_game(other.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "title", .. }));

        // renaming a game to its own title is not a conflict
        let patch = GamePatch {
            title: Some("Elden Ring".into()),
            ..Default::default()
        };
        assert!(catalog.update_game(other.id, patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_store_name_is_rejected() {
        let catalog = MemoryCatalog::new();
        catalog.insert_store(new_store("GameStop")).await.unwrap();
        let other = catalog.insert_store(new_store("Best Buy")).await.unwrap();

        let patch = StorePatch {
            name: Some("GameStop".into()),
            ..Default::default()
        };
        let err = catalog.update_store(other.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "name", .. }));
        let unchanged = catalog.get_store(other.id).await.unwrap().unwrap();
        assert_eq!(unchanged.name, "Best Buy");

        let patch = StorePatch {
            name: Some("Best Buy".into()),
            hours: Some("10:00 - 20:00".into()),
            ..Default::default()
        };
        let updated = catalog.update_store(other.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.hours, "10:00 - 20:00");

        assert!(catalog
            .update_store(42, StorePatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn deleting_a_listing_leaves_its_parents() {
        let catalog = MemoryCatalog::new();
        let game = catalog.insert_game(new_game("Ninja Gaiden")).await.unwrap();
        let store = catalog.insert_store(new_store("EB Games")).await.unwrap();
        let listing = catalog.insert_listing(new_listing(game.id, store.id)).await.unwrap();

        assert!(catalog.delete_listing(listing.id).await.unwrap());
        assert!(!catalog.delete_listing(listing.id).await.unwrap());
        assert!(catalog.get_listing(listing.id).await.unwrap().is_none());
        assert!(catalog.game_exists(game.id).await.unwrap());
        assert!(catalog.store_exists(store.id).await.unwrap());
    }

    #[tokio::test]
    async fn listing_requires_existing_parents() {
        let catalog = MemoryCatalog::new();
        let game = catalog.insert_game(new_game("Kingdom Hearts")).await.unwrap();

        let err = catalog.insert_listing(new_listing(game.id, 9)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference { resource: "Store", id: 9 }
        ));
        assert!(catalog.list_listings(&ListingFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_game_cascades_to_its_listings() {
        let catalog = MemoryCatalog::new();
        let doomed = catalog.insert_game(new_game("Dark Souls 3")).await.unwrap();
        let kept = catalog.insert_game(new_game("Ninja Gaiden")).await.unwrap();
        let store = catalog.insert_store(new_store("Best Buy")).await.unwrap();

        for _ in 0..3 {
            catalog.insert_listing(new_listing(doomed.id, store.id)).await.unwrap();
        }
        let survivor = catalog.insert_listing(new_listing(kept.id, store.id)).await.unwrap();

        assert!(catalog.delete_game(doomed.id).await.unwrap());
        let remaining = catalog.list_listings(&ListingFilter::All).await.unwrap();
        assert_eq!(remaining, vec![survivor]);
        assert!(!catalog.delete_game(doomed.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_store_cascades_to_its_listings() {
        let catalog = MemoryCatalog::new();
        let game = catalog.insert_game(new_game("Rise of the Ronin")).await.unwrap();
        let store = catalog.insert_store(new_store("EB Games")).await.unwrap();
        catalog.insert_listing(new_listing(game.id, store.id)).await.unwrap();

        assert!(catalog.delete_store(store.id).await.unwrap());
        assert!(catalog.listings_for_games(&[game.id]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_listing_checks_new_parent() {
        let catalog = MemoryCatalog::new();
        let game = catalog.insert_game(new_game("Super Smash Bros.")).await.unwrap();
        let store = catalog.insert_store(new_store("Gaming Odyssey")).await.unwrap();
        let listing = catalog.insert_listing(new_listing(game.id, store.id)).await.unwrap();

        let patch = ListingPatch {
            game_id: Some(42),
            ..Default::default()
        };
        let err = catalog.update_listing(listing.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { resource: "Game", .. }));
        assert_eq!(catalog.get_listing(listing.id).await.unwrap(), Some(listing));

        assert!(catalog
            .update_listing(99, ListingPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn reset_restarts_ids() {
        let catalog = MemoryCatalog::new();
        catalog.insert_game(new_game("Mega Man")).await.unwrap();
        catalog.insert_store(new_store("GameStop")).await.unwrap();

        catalog.reset().await.unwrap();
        assert!(catalog.list_games(&GameFilter::All).await.unwrap().is_empty());
        assert_eq!(catalog.insert_game(new_game("Mega Man")).await.unwrap().id, 1);
    }
}
