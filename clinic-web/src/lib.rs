pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;

use config::Settings;
use services::auth_client::SessionProvider;
use services::database::CatalogStore;
use services::storage::ObjectStore;
use std::sync::Arc;

/// Shared application state: configuration plus the capability handles for
/// the hosted auth provider, the catalog database, and the object store.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub sessions: Arc<dyn SessionProvider>,
    pub catalog: Arc<dyn CatalogStore>,
    pub images: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        sessions: Arc<dyn SessionProvider>,
        catalog: Arc<dyn CatalogStore>,
        images: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            settings,
            sessions,
            catalog,
            images,
        }
    }
}
