use dotenv::dotenv;
use tokio::net::TcpListener;

use catalog_service::config::ServiceConfig;
use catalog_service::routes::create_routes;
use catalog_service::state::AppState;
use catalog_service::{open_catalog, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    telemetry::init();

    let config = ServiceConfig::from_env()?;
    let catalog = open_catalog(&config.storage).await?;
    let app = create_routes(AppState::new(catalog));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Catalog service listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
