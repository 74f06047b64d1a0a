/// Application context and dependency injection
use crate::{
    asset_store::AssetStore,
    config::{ItemStoreConfig, ServerConfig},
    db,
    error::ServiceResult,
    item_store::{ItemStore, MemoryItemStore, SqliteItemStore},
    service::InventoryService,
};
use std::sync::Arc;
use tracing::info;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub service: Arc<InventoryService>,
}

impl AppContext {
    /// Build the context from configuration: pick the item store backend,
    /// prepare the cache directory, and wire up the service.
    pub async fn new(config: ServerConfig) -> ServiceResult<Self> {
        config.validate()?;

        let assets = Arc::new(AssetStore::new(config.cache_dir.clone()));
        assets.ensure_dir().await?;

        let items: Arc<dyn ItemStore> = match &config.item_store {
            ItemStoreConfig::Sqlite { path } => {
                let pool = db::create_pool(path).await?;
                db::run_migrations(&pool).await?;
                info!(path = %path.display(), "using sqlite item store");
                Arc::new(SqliteItemStore::new(pool))
            }
            ItemStoreConfig::Memory => {
                info!("using in-memory item store; state will not survive restart");
                Arc::new(MemoryItemStore::new())
            }
        };

        let service = Arc::new(InventoryService::new(items, assets));

        Ok(Self {
            config: Arc::new(config),
            service,
        })
    }
}
