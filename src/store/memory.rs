//! In-process stores.
//!
//! Both stores count the operations they serve and can be told to fail reads
//! or writes, so callers can assert on I/O behaviour without a live server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::{Bson, Document};
use parking_lot::RwLock;

use super::{Domain, DocumentStore, FieldMap, FieldStore, FieldValue, stored_form};
use crate::error::StoreError;

/// Operation counts served by a memory store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub reads: u64,
    pub writes: u64,
}

impl OpCounts {
    pub fn total(&self) -> u64 {
        self.reads + self.writes
    }
}

#[derive(Debug, Default)]
struct OpTracker {
    reads: AtomicU64,
    writes: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl OpTracker {
    fn read(&self, store: &str) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!("{store} read failed")));
        }
        Ok(())
    }

    fn write(&self, store: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!("{store} write failed")));
        }
        Ok(())
    }

    fn counts(&self) -> OpCounts {
        OpCounts {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

/// Field store keeping hashes in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    hashes: DashMap<String, FieldMap>,
    ops: OpTracker,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the hash at `key`, without counting an operation.
    pub fn snapshot(&self, key: &str) -> Option<FieldMap> {
        self.hashes.get(key).map(|h| h.clone())
    }

    pub fn ops(&self) -> OpCounts {
        self.ops.counts()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.ops.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.ops.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    async fn hgetall(&self, key: &str) -> Result<FieldMap, StoreError> {
        self.ops.read("field store")?;
        Ok(self.snapshot(key).unwrap_or_default())
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<FieldValue>>, StoreError> {
        self.ops.read("field store")?;
        let hash = self.hashes.get(key);
        Ok(fields
            .iter()
            .map(|field| hash.as_ref().and_then(|h| h.get(field).cloned()))
            .collect())
    }

    async fn hset(&self, key: &str, fields: &FieldMap) -> Result<(), StoreError> {
        self.ops.write("field store")?;
        // Stored as strings, the way Redis hands them back.
        self.hashes
            .entry(key.to_string())
            .or_default()
            .extend(stored_form(fields));
        Ok(())
    }
}

/// Document store keeping one document per `(domain, _id)`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<HashMap<(String, String), Document>>,
    ops: OpTracker,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, replacing any existing one. The item id is taken from
    /// the document's `_id`, which must be a string.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidDocument`] if `_id` is missing or not a
    /// string.
    pub fn insert(&self, domain: &Domain, document: Document) -> Result<(), StoreError> {
        let item_id = match document.get("_id") {
            Some(Bson::String(id)) => id.clone(),
            _ => {
                return Err(StoreError::InvalidDocument(
                    "document needs a string _id".to_string(),
                ));
            }
        };

        self.docs
            .write()
            .insert((domain.as_str().to_string(), item_id), document);
        Ok(())
    }

    /// Copy of a stored document, without counting an operation.
    pub fn snapshot(&self, domain: &Domain, item_id: &str) -> Option<Document> {
        self.docs
            .read()
            .get(&(domain.as_str().to_string(), item_id.to_string()))
            .cloned()
    }

    pub fn ops(&self) -> OpCounts {
        self.ops.counts()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.ops.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.ops.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_one(
        &self,
        domain: &Domain,
        item_id: &str,
        projection: &[String],
    ) -> Result<Option<Document>, StoreError> {
        self.ops.read("document store")?;

        let Some(document) = self.snapshot(domain, item_id) else {
            return Ok(None);
        };

        if projection.is_empty() {
            return Ok(Some(document));
        }

        // Same shape as a Mongo inclusion projection: `_id` plus the named
        // fields that exist.
        let projected = document
            .into_iter()
            .filter(|(name, _)| name == "_id" || projection.contains(name))
            .collect();
        Ok(Some(projected))
    }

    async fn set_fields(
        &self,
        domain: &Domain,
        item_id: &str,
        fields: &FieldMap,
    ) -> Result<(), StoreError> {
        self.ops.write("document store")?;

        let mut docs = self.docs.write();
        if let Some(document) = docs.get_mut(&(domain.as_str().to_string(), item_id.to_string())) {
            for (name, value) in fields {
                document.insert(name.clone(), Bson::from(value));
            }
        }
        Ok(())
    }
}
