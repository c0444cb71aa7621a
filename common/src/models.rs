use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::validation::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    E,
    T,
    M,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::E, Rating::T, Rating::M];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::E => "E",
            Rating::T => "T",
            Rating::M => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Console {
    PlayStation,
    Xbox,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "Nintendo Switch")]
    NintendoSwitch,
}

impl Console {
    pub const ALL: [Console; 4] = [
        Console::PlayStation,
        Console::Xbox,
        Console::Pc,
        Console::NintendoSwitch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Console::PlayStation => "PlayStation",
            Console::Xbox => "Xbox",
            Console::Pc => "PC",
            Console::NintendoSwitch => "Nintendo Switch",
        }
    }
}

/// Consoles a game ships on, in the shape the client supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Consoles {
    One(Console),
    Many(Vec<Console>),
}

impl Consoles {
    pub fn contains(&self, console: Console) -> bool {
        match self {
            Consoles::One(c) => *c == console,
            Consoles::Many(cs) => cs.contains(&console),
        }
    }
}

/// Raw console field as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConsoleInput {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::New, Condition::Used];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Used => "Used",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i32,
    pub title: String,
    pub rating: Rating,
    pub console: Consoles,
    pub genre: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub condition: Condition,
    pub created_at: DateTime<Utc>,
    pub game_id: i32,
    pub store_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    pub title: String,
    pub rating: String,
    pub console: ConsoleInput,
    pub genre: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGameRequest {
    pub title: Option<String>,
    pub rating: Option<String>,
    pub console: Option<ConsoleInput>,
    pub genre: Option<String>,
    pub image: Option<String>,
}

/// A fully validated game, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub rating: Rating,
    pub console: Consoles,
    pub genre: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    pub title: Option<String>,
    pub rating: Option<Rating>,
    pub console: Option<Consoles>,
    pub genre: Option<String>,
    pub image: Option<String>,
}

impl CreateGameRequest {
    pub fn validate(&self) -> Result<NewGame, ValidationError> {
        Ok(NewGame {
            title: validate_title(&self.title)?,
            rating: validate_rating(&self.rating)?,
            console: validate_consoles(&self.console)?,
            genre: validate_genre(&self.genre)?,
            image: validate_image(&self.image)?,
        })
    }
}

impl UpdateGameRequest {
    pub fn validate(&self) -> Result<GamePatch, ValidationError> {
        Ok(GamePatch {
            title: self.title.as_deref().map(validate_title).transpose()?,
            rating: self.rating.as_deref().map(validate_rating).transpose()?,
            console: self.console.as_ref().map(validate_consoles).transpose()?,
            genre: self.genre.as_deref().map(validate_genre).transpose()?,
            image: self.image.as_deref().map(validate_image).transpose()?,
        })
    }
}

impl GamePatch {
    pub fn apply(self, game: &mut Game) {
        if let Some(title) = self.title {
            game.title = title;
        }
        if let Some(rating) = self.rating {
            game.rating = rating;
        }
        if let Some(console) = self.console {
            game.console = console;
        }
        if let Some(genre) = self.genre {
            game.genre = genre;
        }
        if let Some(image) = self.image {
            game.image = image;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub location: String,
    pub hours: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub name: String,
    pub location: String,
    pub hours: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub hours: Option<String>,
}

impl CreateStoreRequest {
    pub fn validate(&self) -> Result<NewStore, ValidationError> {
        Ok(NewStore {
            name: validate_store_name(&self.name)?,
            location: validate_location(&self.location)?,
            hours: validate_hours(&self.hours)?,
        })
    }
}

impl UpdateStoreRequest {
    pub fn validate(&self) -> Result<StorePatch, ValidationError> {
        Ok(StorePatch {
            name: self.name.as_deref().map(validate_store_name).transpose()?,
            location: self.location.as_deref().map(validate_location).transpose()?,
            hours: self.hours.as_deref().map(validate_hours).transpose()?,
        })
    }
}

impl StorePatch {
    pub fn apply(self, store: &mut Store) {
        if let Some(name) = self.name {
            store.name = name;
        }
        if let Some(location) = self.location {
            store.location = location;
        }
        if let Some(hours) = self.hours {
            store.hours = hours;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub condition: String,
    pub game_id: i64,
    pub store_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateListingRequest {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub condition: Option<String>,
    pub game_id: Option<i64>,
    pub store_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub price: Decimal,
    pub stock: i32,
    pub condition: Condition,
    pub game_id: i32,
    pub store_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub condition: Option<Condition>,
    pub game_id: Option<i32>,
    pub store_id: Option<i32>,
}

impl CreateListingRequest {
    pub fn validate(&self) -> Result<NewListing, ValidationError> {
        Ok(NewListing {
            price: validate_price(self.price)?,
            stock: validate_stock(self.stock)?,
            condition: validate_condition(&self.condition)?,
            game_id: validate_foreign_key("game_id", self.game_id)?,
            store_id: validate_foreign_key("store_id", self.store_id)?,
        })
    }
}

impl UpdateListingRequest {
    pub fn validate(&self) -> Result<ListingPatch, ValidationError> {
        Ok(ListingPatch {
            price: self.price.map(validate_price).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
            condition: self.condition.as_deref().map(validate_condition).transpose()?,
            game_id: self
                .game_id
                .map(|id| validate_foreign_key("game_id", id))
                .transpose()?,
            store_id: self
                .store_id
                .map(|id| validate_foreign_key("store_id", id))
                .transpose()?,
        })
    }
}

impl ListingPatch {
    pub fn apply(self, listing: &mut Listing) {
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(stock) = self.stock {
            listing.stock = stock;
        }
        if let Some(condition) = self.condition {
            listing.condition = condition;
        }
        if let Some(game_id) = self.game_id {
            listing.game_id = game_id;
        }
        if let Some(store_id) = self.store_id {
            listing.store_id = store_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn console_shape_survives_serialization() {
        let one = serde_json::to_value(Consoles::One(Console::NintendoSwitch)).unwrap();
        assert_eq!(one, json!("Nintendo Switch"));

        let many = serde_json::to_value(Consoles::Many(vec![Console::Pc, Console::Xbox])).unwrap();
        assert_eq!(many, json!(["PC", "Xbox"]));

        let back: Consoles = serde_json::from_value(many).unwrap();
        assert_eq!(back, Consoles::Many(vec![Console::Pc, Console::Xbox]));
    }

    #[test]
    fn create_game_request_validates_every_field() {
        let req: CreateGameRequest = serde_json::from_value(json!({
            "title": "Halo",
            "rating": "m",
            "console": ["xbox", "PC"],
            "genre": "Shooter",
            "image": "http://x/y.png"
        }))
        .unwrap();

        let game = req.validate().unwrap();
        assert_eq!(game.rating, Rating::M);
        assert_eq!(game.console, Consoles::Many(vec![Console::Xbox, Console::Pc]));
    }

    #[test]
    fn first_failing_field_is_reported() {
        let req = CreateGameRequest {
            title: "H".into(),
            rating: "Z".into(),
            console: ConsoleInput::One("Xbox".into()),
            genre: "Shooter".into(),
            image: "img".into(),
        };
        assert_eq!(req.validate().unwrap_err().field(), "title");
    }

    #[test]
    fn update_only_checks_supplied_fields() {
        let patch = UpdateGameRequest {
            genre: Some("RPG".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(
            patch,
            GamePatch {
                genre: Some("RPG".into()),
                ..Default::default()
            }
        );

        let err = UpdateStoreRequest {
            hours: Some("late".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "hours");
    }

    #[test]
    fn listing_request_normalizes_condition() {
        let req: CreateListingRequest = serde_json::from_value(json!({
            "price": 10.5,
            "stock": 5,
            "condition": "new",
            "game_id": 1,
            "store_id": 1
        }))
        .unwrap();
        let listing = req.validate().unwrap();
        assert_eq!(listing.condition, Condition::New);
        assert_eq!(listing.price, Decimal::new(105, 1));
    }

    #[test]
    fn listing_patch_price_is_optional() {
        let req: UpdateListingRequest = serde_json::from_value(json!({ "stock": 7 })).unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(patch.price, None);
        assert_eq!(patch.stock, Some(7));

        let req: UpdateListingRequest = serde_json::from_value(json!({ "price": -1.0 })).unwrap();
        assert_eq!(req.validate().unwrap_err().field(), "price");
    }
}
