//! Read-through / write-through item cache.
//!
//! Fetch order is local tier, field store, document store. A document store
//! hit is backfilled into the field store (flat scalar fields only). Updates
//! go to both stores concurrently with no cross-store atomicity.
//!
//! A partial hit in the field store (some requested aspects present, others
//! not) is returned as-is. Only an empty field store result falls through to
//! the document store.
//!
//! Fetched values are always in the field store's string form, whichever
//! tier served them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mongodb::bson::Document;
use serde::Serialize;
use tracing::{debug, warn};

use super::{LocalCacheConfig, LocalTier};
use crate::error::{CacheError, CacheResult, Tier};
use crate::store::{DocumentStore, Domain, FieldMap, FieldStore, FieldValue, stored_form};

/// Synthetic field carrying the requested item id.
pub const ID_FIELD: &str = "id";

/// Document store primary key. Never cached, never returned.
const INTERNAL_ID_FIELD: &str = "_id";

/// Tiered cache over a field store and a document store.
///
/// Cloning is cheap; clones share stores, local tier and counters.
#[derive(Clone)]
pub struct ItemCache {
    fields: Arc<dyn FieldStore>,
    documents: Arc<dyn DocumentStore>,
    local: Option<LocalTier>,
    stats: Arc<StatCounters>,
}

impl ItemCache {
    /// Create an item cache. The local tier is built from `local` unless it
    /// is disabled.
    pub fn new(
        fields: Arc<dyn FieldStore>,
        documents: Arc<dyn DocumentStore>,
        local: &LocalCacheConfig,
    ) -> Self {
        let local = local.enabled.then(|| LocalTier::new(local));

        Self {
            fields,
            documents,
            local,
            stats: Arc::new(StatCounters::default()),
        }
    }

    /// Create an item cache without a local tier.
    pub fn without_local(fields: Arc<dyn FieldStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self::new(fields, documents, &LocalCacheConfig::disabled())
    }

    /// Fetch an item's fields, restricted to `aspects` when non-empty.
    ///
    /// A missing item is not an error: the result is `{id: item_id}`. The
    /// `id` field always equals `item_id`. Every value is a
    /// [`FieldValue::Str`], so a document store hit and a later field store
    /// hit return the same map.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`] for an empty `item_id`;
    /// [`CacheError::Infrastructure`] if a store read or the backfill write
    /// fails.
    pub async fn fetch(
        &self,
        domain: &Domain,
        item_id: &str,
        aspects: &[String],
    ) -> CacheResult<FieldMap> {
        if item_id.is_empty() {
            return Err(CacheError::invalid("item id must not be empty"));
        }

        if let Some(local) = &self.local
            && let Some(item) = local.lookup(domain, item_id, aspects)
        {
            self.stats.local_hits.fetch_add(1, Ordering::Relaxed);
            debug!("{}:{} served from local tier", domain, item_id);
            return Ok(with_id(item, item_id));
        }

        let seen = self.local.as_ref().map(|local| local.generation(domain, item_id));

        let key = domain.key(item_id);
        let mut item = self.read_field_store(&key, aspects).await?;

        if item.is_empty() {
            item = self.read_document_store(domain, item_id, &key, aspects).await?;
        } else {
            self.stats.field_store_hits.fetch_add(1, Ordering::Relaxed);
            debug!("{} served from field store ({} fields)", key, item.len());
        }

        item.remove(INTERNAL_ID_FIELD);
        item.remove(ID_FIELD);

        if let Some(local) = &self.local
            && let Some(seen) = seen
            && !item.is_empty()
            && !local.fill(domain, item_id, &item, aspects.is_empty(), seen)
        {
            debug!("{} changed while fetching, not cached locally", key);
        }

        Ok(with_id(item, item_id))
    }

    /// Write `aspects` to both stores.
    ///
    /// The field store fields are overwritten and the document store gets a
    /// `$set` of the same fields. Both writes always run.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`] for empty `aspects` or `item_id`, with
    /// no I/O performed. [`CacheError::PartialWrite`] when exactly one store
    /// failed; the other store keeps the new values.
    /// [`CacheError::Infrastructure`] when both failed.
    pub async fn update(&self, domain: &Domain, item_id: &str, aspects: &FieldMap) -> CacheResult<()> {
        if aspects.is_empty() {
            return Err(CacheError::invalid("update requires at least one aspect"));
        }
        if item_id.is_empty() {
            return Err(CacheError::invalid("item id must not be empty"));
        }

        let key = domain.key(item_id);
        let (field_result, document_result) = futures::join!(
            self.fields.hset(&key, aspects),
            self.documents.set_fields(domain, item_id, aspects),
        );
        self.stats.updates.fetch_add(1, Ordering::Relaxed);

        if let Some(local) = &self.local {
            let stored = field_result.is_ok().then(|| stored_form(aspects));
            local.record_update(domain, item_id, stored.as_ref());
        }

        match (field_result, document_result) {
            (Ok(()), Ok(())) => {
                debug!("Updated {} ({} fields)", key, aspects.len());
                Ok(())
            }
            (Err(source), Ok(())) => {
                warn!("Field store update for {} failed: {}", key, source);
                Err(CacheError::PartialWrite {
                    tier: Tier::FieldStore,
                    source,
                })
            }
            (Ok(()), Err(source)) => {
                warn!("Document store update for {} failed: {}", key, source);
                Err(CacheError::PartialWrite {
                    tier: Tier::DocumentStore,
                    source,
                })
            }
            (Err(field_err), Err(document_err)) => {
                warn!("Both stores failed to update {}: {}", key, field_err);
                Err(CacheError::Infrastructure(document_err))
            }
        }
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        let s = &self.stats;
        CacheStats {
            local_hits: s.local_hits.load(Ordering::Relaxed),
            field_store_hits: s.field_store_hits.load(Ordering::Relaxed),
            document_store_hits: s.document_store_hits.load(Ordering::Relaxed),
            not_found: s.not_found.load(Ordering::Relaxed),
            backfills: s.backfills.load(Ordering::Relaxed),
            updates: s.updates.load(Ordering::Relaxed),
            local_entries: self.local.as_ref().map_or(0, LocalTier::entry_count),
        }
    }

    async fn read_field_store(&self, key: &str, aspects: &[String]) -> CacheResult<FieldMap> {
        if aspects.is_empty() {
            return Ok(self.fields.hgetall(key).await?);
        }

        let values = self.fields.hmget(key, aspects).await?;
        Ok(aspects
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| (name.clone(), v)))
            .collect())
    }

    /// Document store fallback plus backfill. Returns the cacheable fields,
    /// empty if the document does not exist.
    async fn read_document_store(
        &self,
        domain: &Domain,
        item_id: &str,
        key: &str,
        aspects: &[String],
    ) -> CacheResult<FieldMap> {
        let Some(document) = self.documents.find_one(domain, item_id, aspects).await? else {
            self.stats.not_found.fetch_add(1, Ordering::Relaxed);
            debug!("{} not found in any tier", key);
            return Ok(FieldMap::new());
        };
        self.stats.document_store_hits.fetch_add(1, Ordering::Relaxed);

        let item = cacheable_fields(&document, aspects);
        if item.is_empty() {
            debug!("{} has no cacheable fields, skipping backfill", key);
            return Ok(item);
        }

        self.fields.hset(key, &item).await?;
        self.stats.backfills.fetch_add(1, Ordering::Relaxed);
        debug!("Backfilled {} with {} fields", key, item.len());

        Ok(item)
    }
}

impl std::fmt::Debug for ItemCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemCache")
            .field("local", &self.local)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Present, requested, flat scalar fields of a document, minus `_id` and
/// `id`, in field store form.
fn cacheable_fields(document: &Document, aspects: &[String]) -> FieldMap {
    document
        .iter()
        .filter(|(name, _)| name.as_str() != INTERNAL_ID_FIELD && name.as_str() != ID_FIELD)
        .filter(|(name, _)| aspects.is_empty() || aspects.contains(name))
        .filter_map(|(name, value)| {
            FieldValue::from_bson(value).map(|v| (name.clone(), v.into_stored()))
        })
        .collect()
}

fn with_id(mut item: FieldMap, item_id: &str) -> FieldMap {
    item.insert(ID_FIELD.to_string(), FieldValue::from(item_id));
    item
}

#[derive(Debug, Default)]
struct StatCounters {
    local_hits: AtomicU64,
    field_store_hits: AtomicU64,
    document_store_hits: AtomicU64,
    not_found: AtomicU64,
    backfills: AtomicU64,
    updates: AtomicU64,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub local_hits: u64,
    pub field_store_hits: u64,
    pub document_store_hits: u64,
    /// Fetches that found nothing in any tier.
    pub not_found: u64,
    pub backfills: u64,
    pub updates: u64,
    pub local_entries: u64,
}
