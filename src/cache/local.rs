//! In-process tier over Moka.
//!
//! Every write to an entry goes through `and_compute_with`, which runs under
//! Moka's per-key lock. Updates bump a write generation inside that lock and
//! fills compare it there, so a fetch that read the field store before an
//! update finished can never put the older value back.

use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::ops::compute::Op;
use moka::sync::Cache;

use super::LocalCacheConfig;
use crate::store::{Domain, FieldMap};

type LocalKey = (Domain, String);

/// Write generations are striped; keys sharing a stripe only cost each other
/// a skipped fill.
const GENERATION_STRIPES: usize = 256;

/// Fields known locally for one item.
#[derive(Debug, Clone, Default)]
pub struct LocalEntry {
    pub fields: FieldMap,
    /// True once the entry was filled from an unrestricted fetch, so it can
    /// answer "all fields" requests.
    pub complete: bool,
}

/// Per-process field cache keyed by `(domain, item_id)`.
///
/// Cloning is cheap and shares the same underlying cache.
#[derive(Clone)]
pub struct LocalTier {
    inner: Arc<Cache<LocalKey, LocalEntry>>,
    generations: Arc<[AtomicU64]>,
    hasher: RandomState,
}

impl LocalTier {
    pub fn new(config: &LocalCacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        Self {
            inner: Arc::new(builder.build()),
            generations: (0..GENERATION_STRIPES).map(|_| AtomicU64::new(0)).collect(),
            hasher: RandomState::new(),
        }
    }

    /// Answer a fetch locally.
    ///
    /// Without aspects only a complete entry answers. With aspects the entry
    /// must hold every one of them; the result is projected to exactly those.
    pub fn lookup(&self, domain: &Domain, item_id: &str, aspects: &[String]) -> Option<FieldMap> {
        let entry = self.inner.get(&key(domain, item_id))?;

        if aspects.is_empty() {
            return entry.complete.then_some(entry.fields);
        }

        aspects
            .iter()
            .map(|name| {
                entry
                    .fields
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// Write generation of the item. Capture it before reading the stores
    /// and hand it to [`fill`](Self::fill).
    pub fn generation(&self, domain: &Domain, item_id: &str) -> u64 {
        self.stripe(&key(domain, item_id)).load(Ordering::Acquire)
    }

    /// Merge fields read from the stores into the item's entry.
    ///
    /// Skipped when an update to the item was recorded after `seen` was
    /// captured. Returns whether the entry was written.
    pub fn fill(
        &self,
        domain: &Domain,
        item_id: &str,
        fields: &FieldMap,
        complete: bool,
        seen: u64,
    ) -> bool {
        let key = key(domain, item_id);
        let stripe = self.stripe(&key);

        let mut stored = false;
        self.inner.entry(key).and_compute_with(|current| {
            if stripe.load(Ordering::Acquire) != seen {
                return Op::Nop;
            }
            stored = true;
            Op::Put(merged(current.map(|e| e.into_value()), fields, complete))
        });

        stored
    }

    /// Record a write to the item.
    ///
    /// `Some(fields)` merges the written fields into the entry; `None` drops
    /// the entry. Either way in-flight fills for the item are discarded.
    pub fn record_update(&self, domain: &Domain, item_id: &str, written: Option<&FieldMap>) {
        let key = key(domain, item_id);
        let stripe = self.stripe(&key);

        self.inner.entry(key).and_compute_with(|current| {
            stripe.fetch_add(1, Ordering::AcqRel);
            match written {
                Some(fields) => Op::Put(merged(current.map(|e| e.into_value()), fields, false)),
                None => Op::Remove,
            }
        });
    }

    /// Number of entries. May lag behind concurrent writes.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn stripe(&self, key: &LocalKey) -> &AtomicU64 {
        let index = self.hasher.hash_one(key) as usize % self.generations.len();
        &self.generations[index]
    }
}

impl std::fmt::Debug for LocalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTier")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

fn key(domain: &Domain, item_id: &str) -> LocalKey {
    (domain.clone(), item_id.to_string())
}

fn merged(current: Option<LocalEntry>, fields: &FieldMap, complete: bool) -> LocalEntry {
    let mut entry = current.unwrap_or_default();
    entry
        .fields
        .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    entry.complete |= complete;
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;

    fn map(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    fn fill(tier: &LocalTier, domain: &Domain, id: &str, fields: &FieldMap, complete: bool) -> bool {
        let seen = tier.generation(domain, id);
        tier.fill(domain, id, fields, complete, seen)
    }

    #[test]
    fn test_partial_entry_does_not_answer_full_fetch() {
        let tier = LocalTier::new(&LocalCacheConfig::default());
        assert!(fill(&tier, &Domain::USERS, "1", &map(&[("name", "Ann")]), false));

        assert!(tier.lookup(&Domain::USERS, "1", &[]).is_none());
        assert_eq!(
            tier.lookup(&Domain::USERS, "1", &["name".to_string()]),
            Some(map(&[("name", "Ann")]))
        );
    }

    #[test]
    fn test_lookup_requires_every_aspect() {
        let tier = LocalTier::new(&LocalCacheConfig::default());
        fill(&tier, &Domain::USERS, "1", &map(&[("name", "Ann"), ("age", "30")]), true);

        let aspects = ["name".to_string(), "nick".to_string()];
        assert!(tier.lookup(&Domain::USERS, "1", &aspects).is_none());

        let aspects = ["age".to_string()];
        assert_eq!(
            tier.lookup(&Domain::USERS, "1", &aspects),
            Some(map(&[("age", "30")]))
        );
    }

    #[test]
    fn test_update_keeps_completeness() {
        let tier = LocalTier::new(&LocalCacheConfig::default());
        fill(&tier, &Domain::GUILDS, "7", &map(&[("a", "1")]), true);
        tier.record_update(&Domain::GUILDS, "7", Some(&map(&[("b", "2")])));

        assert_eq!(
            tier.lookup(&Domain::GUILDS, "7", &[]),
            Some(map(&[("a", "1"), ("b", "2")]))
        );

        tier.record_update(&Domain::GUILDS, "7", None);
        assert!(tier.lookup(&Domain::GUILDS, "7", &[]).is_none());
    }

    #[test]
    fn test_fill_after_update_is_discarded() {
        let tier = LocalTier::new(&LocalCacheConfig::default());
        let seen = tier.generation(&Domain::USERS, "1");

        // The update lands between the store read and the fill.
        tier.record_update(&Domain::USERS, "1", Some(&map(&[("name", "Bea")])));
        let stored = tier.fill(&Domain::USERS, "1", &map(&[("name", "Ann")]), true, seen);

        assert!(!stored);
        assert_eq!(
            tier.lookup(&Domain::USERS, "1", &["name".to_string()]),
            Some(map(&[("name", "Bea")]))
        );
        assert!(tier.lookup(&Domain::USERS, "1", &[]).is_none());
    }

    #[test]
    fn test_concurrent_updates_keep_every_field() {
        let tier = LocalTier::new(&LocalCacheConfig::default());
        fill(&tier, &Domain::USERS, "1", &map(&[("name", "Ann")]), true);

        std::thread::scope(|s| {
            for i in 0..8 {
                let tier = &tier;
                s.spawn(move || {
                    let field = format!("f{i}");
                    tier.record_update(&Domain::USERS, "1", Some(&map(&[(field.as_str(), "x")])));
                });
            }
        });

        let entry = tier.lookup(&Domain::USERS, "1", &[]).unwrap();
        assert_eq!(entry.len(), 9);
    }
}
