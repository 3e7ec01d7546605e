use std::sync::Arc;

use crate::config::{AppConfig, DatabaseBackend};
use crate::database::models::indexes;
use crate::database::{DatabaseManager, DocumentStore, Entity, MemoryStore, Repository};

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Pick the store backend named by the configuration. MongoDB connects
    /// lazily on the first request.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn DocumentStore> = match config.database.backend {
            DatabaseBackend::Mongo => Arc::new(DatabaseManager::new(
                config.database.uri.clone(),
                config.database.name.clone(),
                indexes(),
            )),
            DatabaseBackend::Memory => Arc::new(MemoryStore::new(indexes())),
        };
        Self::new(store, config)
    }

    pub fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}
