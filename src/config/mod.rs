//! Configuration module for the data-access core.
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::cache::LocalCacheConfig;

/// Where entities are stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Redis field store + MongoDB document store.
    #[default]
    External,
    /// In-process stores; nothing survives the process.
    Memory,
}

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub timeout: Duration,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StorageBackend,

    // MongoDB
    /// Required for the external backend.
    pub mongo_url: Option<String>,
    pub mongodb_database: String,

    // Redis
    pub redis: RedisConfig,

    /// In-process tier in front of Redis.
    pub local_cache: LocalCacheConfig,
}

impl Config {
    /// Load configuration from environment variables, after loading `.env`
    /// if present.
    ///
    /// # Errors
    /// Returns an error if a value does not parse, or if `MONGO_URL` is
    /// missing for the external backend.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup("STORAGE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "external" => StorageBackend::External,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be 'external' or 'memory', got '{}'", other),
        };

        let mongo_url = lookup("MONGO_URL").filter(|s| !s.is_empty());
        if backend == StorageBackend::External && mongo_url.is_none() {
            bail!("MONGO_URL must be set when STORAGE_BACKEND is external");
        }

        let redis = RedisConfig {
            host: lookup("REDISHOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_var(&lookup, "REDISPORT")?.unwrap_or(6379),
            password: lookup("REDISPASSWORD").filter(|s| !s.is_empty()),
            timeout: Duration::from_secs(parse_var(&lookup, "REDIS_TIMEOUT_SECS")?.unwrap_or(5)),
        };

        let mut local_cache = LocalCacheConfig::default();
        if let Some(enabled) = parse_var(&lookup, "LOCAL_CACHE_ENABLED")? {
            local_cache.enabled = enabled;
        }
        if let Some(capacity) = parse_var(&lookup, "LOCAL_CACHE_CAPACITY")? {
            local_cache = local_cache.max_capacity(capacity);
        }
        if let Some(secs) = parse_var(&lookup, "LOCAL_CACHE_TTL_SECS")? {
            local_cache = local_cache.ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, "LOCAL_CACHE_TTI_SECS")? {
            local_cache = local_cache.tti(Duration::from_secs(secs));
        }

        Ok(Self {
            backend,
            mongo_url,
            mongodb_database: lookup("MONGODB_DATABASE")
                .unwrap_or_else(|| "bloxlink".to_string()),
            redis,
            local_cache,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {name}: '{raw}'"))
        })
        .transpose()
}
