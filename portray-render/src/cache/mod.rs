//! The fragment cache layer.
//!
//! Caching here is opportunistic: before a serialization wave renders its
//! resources, every cacheable member's key is derived and a single
//! [`CacheStore::read_multi`] round trip fetches whatever fragments the
//! store holds. A hit lets the engine skip recomputing the covered
//! attributes; a miss, or no store at all, only changes the cost of the
//! render, never its result.
//!
//! A *fragment* is a previously rendered attribute map for one resource
//! under one include shape. Keys combine the serializer's cache prefix,
//! the resource's stable identity, and the include-shape digest, so the
//! same resource serialized at different include depths occupies distinct
//! entries.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheStore, MemoryStore, NullStore};

use std::collections::HashMap;

use portray_schema::{Resource, Serializer, Value, ValueMap};
use smallvec::SmallVec;
use tracing::debug;

/// Derive the cache key for one resource under one include shape.
///
/// `None` when the serializer has no cache configuration or the resource
/// carries no stable identity.
pub fn key_for(serializer: &Serializer, resource: &dyn Resource, shape: u64) -> Option<CacheKey> {
    if !serializer.is_cacheable() {
        return None;
    }
    let identity = resource.cache_id()?;
    Some(CacheKey::new(serializer.cache_prefix(), identity, shape))
}

/// Merge a cached fragment with freshly computed fields.
///
/// Fresh fields always win on key collision; cached-only keys keep their
/// original positions, fresh-only keys append in computation order.
pub fn merge_fragment(cached: &ValueMap, fresh: ValueMap) -> ValueMap {
    let mut merged = cached.clone();
    for (key, value) in fresh {
        merged.insert(key, value);
    }
    merged
}

/// The cached fragments available to one serialization wave.
///
/// A wave is the set of resources serialized together at one level: the
/// whole top-level collection, or one association's members. Collecting a
/// wave issues at most one bulk read.
#[derive(Debug, Default)]
pub struct FragmentWave {
    keys: SmallVec<[Option<CacheKey>; 8]>,
    fragments: HashMap<CacheKey, ValueMap>,
}

impl FragmentWave {
    /// A wave with no fragments; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive keys for every member and fetch their fragments in one bulk
    /// read.
    ///
    /// Members with nothing to cache get no key; when no member has a key,
    /// or no store is configured, the store is not contacted at all.
    pub fn collect<'a, I>(store: Option<&dyn CacheStore>, members: I, shape: u64) -> Self
    where
        I: IntoIterator<Item = (&'a Serializer, &'a dyn Resource)>,
    {
        let keys: SmallVec<[Option<CacheKey>; 8]> = members
            .into_iter()
            .map(|(serializer, resource)| key_for(serializer, resource, shape))
            .collect();

        let wanted: SmallVec<[CacheKey; 8]> = keys.iter().flatten().cloned().collect();
        let mut fragments = HashMap::new();
        if let Some(store) = store {
            if !wanted.is_empty() {
                for (key, value) in store.read_multi(&wanted) {
                    // Only map-shaped fragments can serve attribute reads
                    if let Value::Map(map) = value {
                        fragments.insert(key, map);
                    }
                }
                debug!(
                    wave = keys.len(),
                    wanted = wanted.len(),
                    hits = fragments.len(),
                    "fragment wave collected"
                );
            }
        }

        Self { keys, fragments }
    }

    /// The cached fragment for the wave member at `index`, if any.
    pub fn fragment(&self, index: usize) -> Option<&ValueMap> {
        self.keys
            .get(index)?
            .as_ref()
            .and_then(|key| self.fragments.get(key))
    }

    /// Number of members whose fragments were found.
    pub fn hit_count(&self) -> usize {
        self.keys
            .iter()
            .flatten()
            .filter(|key| self.fragments.contains_key(*key))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portray_schema::{CacheConfig, Related, ResourceError, ResourceResult};

    struct Row {
        id: Option<&'static str>,
    }

    impl Resource for Row {
        fn type_name(&self) -> &str {
            "Row"
        }

        fn attribute(&self, name: &str) -> ResourceResult<Value> {
            Err(ResourceError::unknown_attribute(name, self.type_name()))
        }

        fn related(&self, name: &str) -> ResourceResult<Related> {
            Err(ResourceError::unknown_association(name, self.type_name()))
        }

        fn cache_id(&self) -> Option<String> {
            self.id.map(String::from)
        }
    }

    fn cacheable() -> Serializer {
        Serializer::new("RowSerializer").attr("id").cache(CacheConfig::new())
    }

    fn fragment_value(entries: &[(&str, Value)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    // ==================== Key Derivation Tests ====================

    #[test]
    fn test_key_requires_cache_config_and_identity() {
        let with_id = Row { id: Some("1") };
        let without_id = Row { id: None };
        let plain = Serializer::new("RowSerializer");

        assert!(key_for(&cacheable(), &with_id, 0).is_some());
        assert!(key_for(&cacheable(), &without_id, 0).is_none());
        assert!(key_for(&plain, &with_id, 0).is_none());
    }

    #[test]
    fn test_key_embeds_shape() {
        let row = Row { id: Some("1") };
        let serializer = cacheable();
        let a = key_for(&serializer, &row, 1).unwrap();
        let b = key_for(&serializer, &row, 2).unwrap();
        assert_ne!(a, b);
    }

    // ==================== Wave Tests ====================

    #[test]
    fn test_collect_issues_one_bulk_read() {
        let store = MemoryStore::new();
        let serializer = cacheable();
        let rows = [Row { id: Some("1") }, Row { id: Some("2") }];

        let wave = FragmentWave::collect(
            Some(&store),
            rows.iter().map(|r| (&serializer, r as &dyn Resource)),
            0,
        );

        assert_eq!(store.read_count(), 1);
        assert_eq!(wave.hit_count(), 0);
    }

    #[test]
    fn test_collect_skips_store_without_keys() {
        let store = MemoryStore::new();
        let serializer = Serializer::new("RowSerializer");
        let rows = [Row { id: Some("1") }];

        let wave = FragmentWave::collect(
            Some(&store),
            rows.iter().map(|r| (&serializer, r as &dyn Resource)),
            0,
        );

        assert_eq!(store.read_count(), 0);
        assert!(wave.fragment(0).is_none());
    }

    #[test]
    fn test_fragment_served_per_member() {
        let store = MemoryStore::new();
        let serializer = cacheable();
        let rows = [Row { id: Some("1") }, Row { id: Some("2") }];

        let key = key_for(&serializer, &rows[1], 9).unwrap();
        store.populate(key, fragment_value(&[("id", 2.into())]));

        let wave = FragmentWave::collect(
            Some(&store),
            rows.iter().map(|r| (&serializer, r as &dyn Resource)),
            9,
        );

        assert!(wave.fragment(0).is_none());
        let hit = wave.fragment(1).unwrap();
        assert_eq!(hit.get("id"), Some(&Value::Int(2)));
        assert_eq!(wave.hit_count(), 1);
    }

    #[test]
    fn test_non_map_fragment_ignored() {
        let store = MemoryStore::new();
        let serializer = cacheable();
        let rows = [Row { id: Some("1") }];

        let key = key_for(&serializer, &rows[0], 0).unwrap();
        store.populate(key, Value::from("not a map"));

        let wave = FragmentWave::collect(
            Some(&store),
            rows.iter().map(|r| (&serializer, r as &dyn Resource)),
            0,
        );
        assert!(wave.fragment(0).is_none());
    }

    #[test]
    fn test_no_store_is_permanent_miss() {
        let serializer = cacheable();
        let rows = [Row { id: Some("1") }];
        let wave = FragmentWave::collect(
            None,
            rows.iter().map(|r| (&serializer, r as &dyn Resource)),
            0,
        );
        assert!(wave.fragment(0).is_none());
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_fresh_wins() {
        let mut cached = ValueMap::new();
        cached.insert("id".to_string(), 1.into());
        cached.insert("title".to_string(), "stale".into());

        let mut fresh = ValueMap::new();
        fresh.insert("title".to_string(), "current".into());
        fresh.insert("views".to_string(), 3.into());

        let merged = merge_fragment(&cached, fresh);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["id", "title", "views"]);
        assert_eq!(merged["title"], Value::from("current"));
        assert_eq!(merged["id"], Value::Int(1));
    }
}
