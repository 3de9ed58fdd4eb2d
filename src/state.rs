use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{repo::UserRepo, JwtKeys};
use crate::config::{AppConfig, StoreBackend};
use crate::gifts::repo::GiftRepo;
use crate::store::{MemoryStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub gifts: Arc<dyn GiftRepo>,
    pub jwt: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Builds the stores named by `config`. The Postgres backend connects and
    /// migrates before returning, so an unreachable database fails startup.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::Postgres => {
                let db = config
                    .database
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
                let store = Arc::new(PgStore::connect(&db.url, db.max_connections).await?);
                store.migrate().await?;
                info!("connected to postgres");
                Ok(Self::from_parts(store.clone(), store, config))
            }
            StoreBackend::Memory => {
                warn!("using in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                Ok(Self::from_parts(store.clone(), store, config))
            }
        }
    }

    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        gifts: Arc<dyn GiftRepo>,
        config: AppConfig,
    ) -> Self {
        Self {
            users,
            gifts,
            jwt: JwtKeys::from_config(&config.jwt),
            config: Arc::new(config),
        }
    }

    /// State over a fresh in-memory store with a fixed signing key.
    #[cfg(test)]
    pub fn fake() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig {
            store_backend: StoreBackend::Memory,
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        };
        (Self::from_parts(store.clone(), store.clone(), config), store)
    }
}
