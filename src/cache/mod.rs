//! Cache module - tiered item cache.
//!
//! ## Tiers
//!
//! 1. Local tier - per-process Moka cache (optional, short TTL)
//! 2. Field store - Redis hashes, no expiry
//! 3. Document store - MongoDB, system of record
//!
//! ## Usage
//!
//! ```rust,ignore
//! let cache = ItemCache::new(redis, mongo, &LocalCacheConfig::default());
//!
//! let user = cache.fetch(&Domain::USERS, "42", &["robloxID".to_string()]).await?;
//! cache.update(&Domain::USERS, "42", &fields).await?;
//! ```

mod config;
mod item;
mod local;

pub use config::LocalCacheConfig;
pub use item::{CacheStats, ID_FIELD, ItemCache};
pub use local::{LocalEntry, LocalTier};
