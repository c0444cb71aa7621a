use chrono::{DateTime, Utc};
use sqlx::types::{Decimal, Json};
use sqlx::FromRow;

use common::{Condition, Consoles, Game, Listing, Rating, Store};

#[derive(Debug, sqlx::Type, Clone, Copy)]
#[sqlx(type_name = "game_rating")]
pub enum DbRating {
    E,
    T,
    M,
}

#[derive(Debug, sqlx::Type, Clone, Copy)]
#[sqlx(type_name = "listing_condition")]
pub enum DbCondition {
    New,
    Used,
}

impl From<Rating> for DbRating {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::E => DbRating::E,
            Rating::T => DbRating::T,
            Rating::M => DbRating::M,
        }
    }
}

impl From<DbRating> for Rating {
    fn from(rating: DbRating) -> Self {
        match rating {
            DbRating::E => Rating::E,
            DbRating::T => Rating::T,
            DbRating::M => Rating::M,
        }
    }
}

impl From<Condition> for DbCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::New => DbCondition::New,
            Condition::Used => DbCondition::Used,
        }
    }
}

impl From<DbCondition> for Condition {
    fn from(condition: DbCondition) -> Self {
        match condition {
            DbCondition::New => Condition::New,
            DbCondition::Used => Condition::Used,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbGame {
    pub id: i32,
    pub title: String,
    pub rating: DbRating,
    pub console: Json<Consoles>,
    pub genre: String,
    pub image: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbStore {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub hours: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbListing {
    pub id: i32,
    pub price: Decimal,
    pub stock: i32,
    pub condition: DbCondition,
    pub created_at: DateTime<Utc>,
    pub game_id: i32,
    pub store_id: i32,
}

impl From<DbGame> for Game {
    fn from(row: DbGame) -> Self {
        Game {
            id: row.id,
            title: row.title,
            rating: row.rating.into(),
            console: row.console.0,
            genre: row.genre,
            image: row.image,
        }
    }
}

impl From<DbStore> for Store {
    fn from(row: DbStore) -> Self {
        Store {
            id: row.id,
            name: row.name,
            location: row.location,
            hours: row.hours,
        }
    }
}

impl From<DbListing> for Listing {
    fn from(row: DbListing) -> Self {
        Listing {
            id: row.id,
            price: row.price,
            stock: row.stock,
            condition: row.condition.into(),
            created_at: row.created_at,
            game_id: row.game_id,
            store_id: row.store_id,
        }
    }
}
