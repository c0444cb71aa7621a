pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod projection;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use crate::config::Storage;
use crate::db::PgCatalog;
use crate::memory::MemoryCatalog;
use crate::store::CatalogStore;

/// Open the configured catalog backend. Postgres migrations run on connect.
pub async fn open_catalog(storage: &Storage) -> Result<Arc<dyn CatalogStore>, sqlx::Error> {
    match storage {
        Storage::Postgres {
            database_url,
            max_connections,
        } => {
            let catalog = PgCatalog::connect(database_url, *max_connections).await?;
            tracing::info!("connected to postgres");
            Ok(Arc::new(catalog))
        }
        Storage::Memory => {
            tracing::warn!("using in-memory catalog; data is lost on exit");
            Ok(Arc::new(MemoryCatalog::new()))
        }
    }
}
