//! External cache store contract and the built-in stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use portray_schema::Value;

use super::key::CacheKey;

/// An external key/value store holding previously rendered fragments.
///
/// The rendering core only ever *reads*, in one bulk round trip per
/// serialization wave; whatever populates the store does so out-of-band.
/// Stores are best effort: a missing key, an evicted entry, or an entirely
/// absent store just means the fragment is computed fresh.
pub trait CacheStore: Send + Sync {
    /// Fetch whichever of the given keys are present.
    ///
    /// Missing keys are simply absent from the returned map, never an
    /// error.
    fn read_multi(&self, keys: &[CacheKey]) -> HashMap<CacheKey, Value>;
}

/// An in-process store backed by a hash map.
///
/// Suitable for single-process use and for tests.
/// [`populate`](MemoryStore::populate) stands in for the out-of-band
/// writer, and [`read_count`](MemoryStore::read_count) exposes how many
/// bulk reads were issued so tests can assert the one-read-per-wave
/// behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, Value>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fragment, replacing any previous value under the key.
    pub fn populate(&self, key: CacheKey, fragment: Value) {
        self.entries.write().insert(key, fragment);
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every fragment.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// How many bulk reads have been issued against this store.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl CacheStore for MemoryStore {
    fn read_multi(&self, keys: &[CacheKey]) -> HashMap<CacheKey, Value> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.read();
        keys.iter()
            .filter_map(|key| entries.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }
}

/// A store that never holds anything.
///
/// Explicit opt-out of caching; every read is a permanent miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn read_multi(&self, _keys: &[CacheKey]) -> HashMap<CacheKey, Value> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let key = CacheKey::new("Post", "1", 0);
        store.populate(key.clone(), Value::from("cached"));

        let missing = CacheKey::new("Post", "2", 0);
        let found = store.read_multi(&[key.clone(), missing.clone()]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[&key], Value::from("cached"));
        assert!(!found.contains_key(&missing));
    }

    #[test]
    fn test_memory_store_counts_bulk_reads() {
        let store = MemoryStore::new();
        assert_eq!(store.read_count(), 0);

        store.read_multi(&[]);
        store.read_multi(&[CacheKey::new("Post", "1", 0)]);
        assert_eq!(store.read_count(), 2);
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryStore::new();
        store.populate(CacheKey::new("Post", "1", 0), Value::Null);
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_null_store_always_misses() {
        let store = NullStore;
        let found = store.read_multi(&[CacheKey::new("Post", "1", 0)]);
        assert!(found.is_empty());
    }
}
