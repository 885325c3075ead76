//! Shared application state handed to command handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::ItemCache;
use crate::config::{Config, StorageBackend};
use crate::error::CacheResult;
use crate::models::{Entity, GuildData, UserData};
use crate::store::{
    DocumentStore, FieldMap, FieldStore, MemoryDocumentStore, MemoryFieldStore,
    MongoDocumentStore, RedisFieldStore,
};

/// Shared application state.
///
/// Cheap to clone; every handler gets its own copy.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Tiered item cache.
    pub items: ItemCache,

    started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around an existing item cache.
    pub fn new(items: ItemCache) -> Self {
        Self {
            items,
            started_at: Utc::now(),
        }
    }

    /// Connect the configured stores and build the state.
    ///
    /// # Errors
    /// Returns error if either store cannot be reached.
    pub async fn connect(config: &Config) -> Result<Self> {
        let (fields, documents): (Arc<dyn FieldStore>, Arc<dyn DocumentStore>) =
            match config.backend {
                StorageBackend::Memory => {
                    info!("Using in-memory stores");
                    (
                        Arc::new(MemoryFieldStore::new()),
                        Arc::new(MemoryDocumentStore::new()),
                    )
                }
                StorageBackend::External => {
                    let mongo_url = config
                        .mongo_url
                        .as_deref()
                        .context("MONGO_URL must be set for the external backend")?;

                    info!("Connecting to MongoDB...");
                    let mongo = MongoDocumentStore::connect(mongo_url, &config.mongodb_database)
                        .await
                        .context("failed to connect to MongoDB")?;

                    info!("Connecting to Redis...");
                    let redis = RedisFieldStore::connect(
                        &config.redis.host,
                        config.redis.port,
                        config.redis.password.as_deref(),
                        config.redis.timeout,
                    )
                    .await
                    .context("failed to connect to Redis")?;

                    (Arc::new(redis), Arc::new(mongo))
                }
            };

        let items = ItemCache::new(fields, documents, &config.local_cache);
        info!(
            "Item cache initialized (local tier: {})",
            if config.local_cache.enabled { "on" } else { "off" }
        );

        Ok(Self::new(items))
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Fetch any entity kind from its domain.
    pub async fn fetch<E: Entity>(&self, item_id: &str, aspects: &[&str]) -> CacheResult<E> {
        let aspects: Vec<String> = aspects.iter().map(|a| a.to_string()).collect();
        let fields = self.items.fetch(&E::DOMAIN, item_id, &aspects).await?;
        Ok(E::from_fields(item_id, &fields))
    }

    /// Fetch a user, restricted to `aspects` when non-empty.
    pub async fn fetch_user(&self, user_id: &str, aspects: &[&str]) -> CacheResult<UserData> {
        self.fetch(user_id, aspects).await
    }

    /// Fetch a guild's data, restricted to `aspects` when non-empty.
    pub async fn fetch_guild_data(&self, guild_id: &str, aspects: &[&str]) -> CacheResult<GuildData> {
        self.fetch(guild_id, aspects).await
    }

    /// Update a user's aspects in every tier.
    pub async fn update_user_data(&self, user_id: &str, aspects: &FieldMap) -> CacheResult<()> {
        self.items.update(&UserData::DOMAIN, user_id, aspects).await
    }

    /// Update a guild's aspects in every tier.
    pub async fn update_guild_data(&self, guild_id: &str, aspects: &FieldMap) -> CacheResult<()> {
        self.items.update(&GuildData::DOMAIN, guild_id, aspects).await
    }
}
