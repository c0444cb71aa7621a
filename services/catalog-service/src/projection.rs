//! Response projections.
//!
//! Each view type fixes which related rows are embedded. Back-references are
//! left out by construction: a game's listings carry their store but not the
//! game, a store's listings carry their game but not the store, and a
//! listing's game and store carry no listings.
//!
//! Related rows are loaded in batches, one query per relationship. Reads are
//! not snapshotted, so a listing whose parent is deleted mid-read is dropped
//! from the view instead of failing the whole response.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use common::{Game, Listing, Store};

use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    #[serde(flatten)]
    pub game: Game,
    pub listings: Vec<GameListingView>,
}

/// A listing as seen from its game.
#[derive(Debug, Clone, Serialize)]
pub struct GameListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub store: Store,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreView {
    #[serde(flatten)]
    pub store: Store,
    pub listings: Vec<StoreListingView>,
}

/// A listing as seen from its store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub game: Game,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub game: Game,
    pub store: Store,
}

fn distinct(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

fn index<T>(rows: Vec<T>, id: impl Fn(&T) -> i32) -> HashMap<i32, T> {
    rows.into_iter().map(|row| (id(&row), row)).collect()
}

async fn listings_by_game(
    catalog: &dyn CatalogStore,
    game_ids: &[i32],
) -> Result<HashMap<i32, Vec<GameListingView>>, StoreError> {
    let listings = catalog.listings_for_games(game_ids).await?;
    let store_ids = distinct(listings.iter().map(|l| l.store_id));
    let stores = index(catalog.stores_by_ids(&store_ids).await?, |s| s.id);

    let mut grouped: HashMap<i32, Vec<GameListingView>> = HashMap::new();
    for listing in listings {
        let Some(store) = stores.get(&listing.store_id).cloned() else {
            continue;
        };
        grouped
            .entry(listing.game_id)
            .or_default()
            .push(GameListingView { listing, store });
    }
    Ok(grouped)
}

async fn listings_by_store(
    catalog: &dyn CatalogStore,
    store_ids: &[i32],
) -> Result<HashMap<i32, Vec<StoreListingView>>, StoreError> {
    let listings = catalog.listings_for_stores(store_ids).await?;
    let game_ids = distinct(listings.iter().map(|l| l.game_id));
    let games = index(catalog.games_by_ids(&game_ids).await?, |g| g.id);

    let mut grouped: HashMap<i32, Vec<StoreListingView>> = HashMap::new();
    for listing in listings {
        let Some(game) = games.get(&listing.game_id).cloned() else {
            continue;
        };
        grouped
            .entry(listing.store_id)
            .or_default()
            .push(StoreListingView { listing, game });
    }
    Ok(grouped)
}

pub async fn game_views(
    catalog: &dyn CatalogStore,
    games: Vec<Game>,
) -> Result<Vec<GameView>, StoreError> {
    let ids: Vec<i32> = games.iter().map(|g| g.id).collect();
    let mut related = listings_by_game(catalog, &ids).await?;

    Ok(games
        .into_iter()
        .map(|game| GameView {
            listings: related.remove(&game.id).unwrap_or_default(),
            game,
        })
        .collect())
}

pub async fn game_view(catalog: &dyn CatalogStore, game: Game) -> Result<GameView, StoreError> {
    let mut related = listings_by_game(catalog, &[game.id]).await?;
    Ok(GameView {
        listings: related.remove(&game.id).unwrap_or_default(),
        game,
    })
}

pub async fn store_views(
    catalog: &dyn CatalogStore,
    stores: Vec<Store>,
) -> Result<Vec<StoreView>, StoreError> {
    let ids: Vec<i32> = stores.iter().map(|s| s.id).collect();
    let mut related = listings_by_store(catalog, &ids).await?;

    Ok(stores
        .into_iter()
        .map(|store| StoreView {
            listings: related.remove(&store.id).unwrap_or_default(),
            store,
        })
        .collect())
}

pub async fn store_view(catalog: &dyn CatalogStore, store: Store) -> Result<StoreView, StoreError> {
    let mut related = listings_by_store(catalog, &[store.id]).await?;
    Ok(StoreView {
        listings: related.remove(&store.id).unwrap_or_default(),
        store,
    })
}

pub async fn listing_views(
    catalog: &dyn CatalogStore,
    listings: Vec<Listing>,
) -> Result<Vec<ListingView>, StoreError> {
    let game_ids = distinct(listings.iter().map(|l| l.game_id));
    let store_ids = distinct(listings.iter().map(|l| l.store_id));
    let games = index(catalog.games_by_ids(&game_ids).await?, |g| g.id);
    let stores = index(catalog.stores_by_ids(&store_ids).await?, |s| s.id);

    Ok(listings
        .into_iter()
        .filter_map(|listing| {
            Some(ListingView {
                game: games.get(&listing.game_id)?.clone(),
                store: stores.get(&listing.store_id)?.clone(),
                listing,
            })
        })
        .collect())
}

/// `None` when either parent is gone, which means the listing went with it.
pub async fn listing_view(
    catalog: &dyn CatalogStore,
    listing: Listing,
) -> Result<Option<ListingView>, StoreError> {
    let Some(game) = catalog.get_game(listing.game_id).await? else {
        return Ok(None);
    };
    let Some(store) = catalog.get_store(listing.store_id).await? else {
        return Ok(None);
    };
    Ok(Some(ListingView { listing, game, store }))
}
