//! Sample data for local development.
//!
//! Everything goes through the request validation and the catalog store, so
//! seeded rows look exactly like rows created over HTTP.

use rand::Rng;
use rust_decimal::Decimal;

use common::{
    ConsoleInput, CreateGameRequest, CreateListingRequest, CreateStoreRequest, ValidationError,
};

use crate::store::{CatalogStore, StoreError};

const GAMES: [(&str, &str); 10] = [
    ("Mega Man", "https://static.wikia.nocookie.net/megaman/images/4/42/Kotobukiya%27s_X_Model_Kit.jpg/revision/latest?cb=20220501181742"),
    ("Donkey Kong", "https://encrypted-tbn3.gstatic.com/images?q=tbn:ANd9GcSuZ4WZ1W_-MfVFcVHuiXseEXJ5YeW5yQAdEb7BQ4thjhQRqp3FTDo4m8T7wXmodDkYDssk"),
    ("Rise of the Ronin", "https://image.api.playstation.com/vulcan/ap/rnd/202212/2201/ZfPosZoz1CKZBHTIKUCQRy47.png"),
    ("Super Smash Bros.", "https://assets.nintendo.com/image/upload/q_auto:best/f_auto/dpr_2.0/ncom/software/switch/70010000012332/ac4d1fc9824876ce756406f0525d50c57ded4b2a666f6dfe40a6ac5c3563fad9"),
    ("Kingdom Hearts", "https://m.media-amazon.com/images/I/918AUL+i-DL.jpg"),
    ("Nioh II", "https://image.api.playstation.com/vulcan/img/rnd/202011/0423/P7Sm4r3F8krCQcnN5uqwsS00.png"),
    ("Elden Ring", "https://image.api.playstation.com/vulcan/ap/rnd/202110/2000/aGhopp3MHppi7kooGE2Dtt8C.png"),
    ("Dark Souls 3", "https://static.bandainamcoent.eu/high/dark-souls/dark-souls-3/00-page-setup/ds3_game-thumbnail.jpg"),
    ("Ninja Gaiden", "https://static.wikia.nocookie.net/deadoralive/images/6/62/Img-hayabusa.png/revision/latest/scale-to-width-down/1000?cb=20180613004303"),
    ("Street Fighter 6", "https://placehold.co/400x600?text=Street+Fighter+6"),
];

const STORES: [(&str, &str); 5] = [
    ("GameStop", "640 Camino Del Rio N STE 317A, San Diego, CA 92108"),
    ("EB Games", "2612 S Shepherd Dr Houston, TX 77098"),
    ("Best Buy", "3 Mill Creek Dr, Secaucus, NJ 07094"),
    ("Electronics Boutique", "2589 Walter Green Cmns, Madison, OH 44057"),
    ("Gaming Odyssey", "1400 Skyline Blvd, Bismarck, ND 58503"),
];

const RATINGS: [&str; 3] = ["E", "T", "M"];
const CONSOLES: [&str; 4] = ["PlayStation", "Xbox", "PC", "Nintendo Switch"];
const GENRES: [&str; 5] = ["Action", "Adventure", "RPG", "Strategy", "Shooter"];
const CONDITIONS: [&str; 2] = ["New", "Used"];
const LISTINGS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed data rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub games: usize,
    pub stores: usize,
    pub listings: usize,
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Wipe the catalog and fill it with sample games, stores and listings.
pub async fn run<R: Rng + Send>(
    catalog: &dyn CatalogStore,
    rng: &mut R,
) -> Result<SeedSummary, SeedError> {
    catalog.reset().await?;
    tracing::info!("catalog cleared");

    let mut game_ids = Vec::with_capacity(GAMES.len());
    for (title, image) in GAMES {
        let request = CreateGameRequest {
            title: title.to_string(),
            rating: pick(rng, &RATINGS).to_string(),
            console: ConsoleInput::One(pick(rng, &CONSOLES).to_string()),
            genre: pick(rng, &GENRES).to_string(),
            image: image.to_string(),
        };
        let game = catalog.insert_game(request.validate()?).await?;
        game_ids.push(game.id);
    }
    tracing::info!(count = game_ids.len(), "seeded games");

    let mut store_ids = Vec::with_capacity(STORES.len());
    for (name, location) in STORES {
        let request = CreateStoreRequest {
            name: name.to_string(),
            location: location.to_string(),
            hours: format!("{}:00 - {}:00", rng.gen_range(8..=10), rng.gen_range(18..=22)),
        };
        let store = catalog.insert_store(request.validate()?).await?;
        store_ids.push(store.id);
    }
    tracing::info!(count = store_ids.len(), "seeded stores");

    for _ in 0..LISTINGS {
        let cents = rng.gen_range(5..=60) * 100 + rng.gen_range(0..=99);
        let request = CreateListingRequest {
            price: Decimal::new(cents, 2),
            stock: rng.gen_range(0..=100),
            condition: pick(rng, &CONDITIONS).to_string(),
            game_id: i64::from(*pick(rng, &game_ids)),
            store_id: i64::from(*pick(rng, &store_ids)),
        };
        catalog.insert_listing(request.validate()?).await?;
    }
    tracing::info!(count = LISTINGS, "seeded listings");

    Ok(SeedSummary {
        games: game_ids.len(),
        stores: store_ids.len(),
        listings: LISTINGS,
    })
}
