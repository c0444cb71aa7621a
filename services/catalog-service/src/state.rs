use std::sync::Arc;

use crate::store::CatalogStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }
}
