//! Storage tiers behind the item cache.
//!
//! Two contracts are consumed:
//!
//! - [`FieldStore`] - flat per-key hashes addressed by `domain:item_id` (Redis)
//! - [`DocumentStore`] - full documents addressed by `(domain, item_id)` (MongoDB)
//!
//! Both are shared, long-lived handles that manage their own concurrency.
//! The in-memory implementations back the test suite and the `memory`
//! storage backend.

mod domain;
mod memory;
mod mongo;
mod redis;
mod value;

use async_trait::async_trait;
use mongodb::bson::Document;

pub use domain::Domain;
pub use memory::{MemoryDocumentStore, MemoryFieldStore, OpCounts};
pub use mongo::MongoDocumentStore;
pub use redis::RedisFieldStore;
pub use value::{FieldMap, FieldValue, stored_form};

use crate::error::StoreError;

/// Hash-per-key store with partial field reads and writes.
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Read every field stored under `key`. A missing key yields an empty map.
    async fn hgetall(&self, key: &str) -> Result<FieldMap, StoreError>;

    /// Read the given fields. The result is aligned with `fields`; `None`
    /// marks a field with no stored value.
    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<FieldValue>>, StoreError>;

    /// Set the given fields, leaving all others untouched.
    async fn hset(&self, key: &str, fields: &FieldMap) -> Result<(), StoreError>;
}

/// System-of-record store holding one document per item.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the document with `_id == item_id`. A non-empty `projection`
    /// limits the returned fields to those names (plus `_id`).
    async fn find_one(
        &self,
        domain: &Domain,
        item_id: &str,
        projection: &[String],
    ) -> Result<Option<Document>, StoreError>;

    /// `$set` the given fields on the document. Does not create the document
    /// if it is missing.
    async fn set_fields(
        &self,
        domain: &Domain,
        item_id: &str,
        fields: &FieldMap,
    ) -> Result<(), StoreError>;
}
