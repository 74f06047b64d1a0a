/// Configuration management for the inventory service
use crate::error::{ServiceError, ServiceResult};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments; every flag falls back to an environment variable.
#[derive(Debug, Parser)]
#[command(name = "inventory-service", about = "Inventory catalog service")]
pub struct Cli {
    /// Server host
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Cache folder for uploaded photos
    #[arg(short, long, env = "CACHE_PATH", default_value = "./uploads")]
    pub cache: PathBuf,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/inventory.sqlite")]
    pub database: PathBuf,

    /// Item store backend: "sqlite" or "memory"
    #[arg(long, env = "ITEM_STORE", default_value = "sqlite")]
    pub store: String,
}

/// Main server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory where photo blobs are written
    pub cache_dir: PathBuf,
    pub item_store: ItemStoreConfig,
}

/// Item store backend selection
#[derive(Debug, Clone)]
pub enum ItemStoreConfig {
    /// Durable SQLite-backed store
    Sqlite { path: PathBuf },
    /// In-process store; state is lost on restart
    Memory,
}

impl ServerConfig {
    /// Load configuration from command-line flags and environment variables
    pub fn load() -> ServiceResult<Self> {
        dotenv::dotenv().ok();
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> ServiceResult<Self> {
        let item_store = match cli.store.as_str() {
            "sqlite" => ItemStoreConfig::Sqlite { path: cli.database },
            "memory" => ItemStoreConfig::Memory,
            other => {
                return Err(ServiceError::Validation(format!(
                    "Unknown item store backend: {}",
                    other
                )))
            }
        };

        let config = Self {
            host: cli.host,
            port: cli.port,
            cache_dir: cli.cache,
            item_store,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ServiceResult<()> {
        if self.host.is_empty() {
            return Err(ServiceError::Validation("Host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ServiceError::Validation("Port cannot be 0".to_string()));
        }
        Ok(())
    }
}
