use dotenv::dotenv;
use rand::rngs::StdRng;
use rand::SeedableRng;

use catalog_service::config::ServiceConfig;
use catalog_service::{open_catalog, seed, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    telemetry::init();

    let config = ServiceConfig::from_env()?;
    let catalog = open_catalog(&config.storage).await?;

    tracing::info!("Starting seed...");
    let summary = seed::run(catalog.as_ref(), &mut StdRng::from_entropy()).await?;
    tracing::info!(
        games = summary.games,
        stores = summary.stores,
        listings = summary.listings,
        "Seeding complete"
    );

    Ok(())
}
