//! Bloxlink data-access core.
//!
//! Serves user and guild data through a tiered cache.
//!
//! ## Architecture
//!
//! - `store` - Field store (Redis) and document store (MongoDB) adapters
//! - `cache` - Item cache: local tier, read-through fetch, write-through update
//! - `models` - Typed entities (`UserData`, `GuildData`)
//! - `bot` - Application state handed to command handlers
//! - `config` - Environment configuration
//! - `cli` - Maintenance commands

pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use bot::AppState;
pub use cache::ItemCache;
pub use error::{CacheError, StoreError};
