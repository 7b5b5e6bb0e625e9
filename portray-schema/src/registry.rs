//! The serializer registry.
//!
//! Maps resource type names to serializer definitions and answers the
//! "which serializer renders this resource?" question through an explicit,
//! ordered list of lookup strategies. Lookup results are memoized in a
//! process-wide table; a race that computes the same answer twice is
//! harmless, and registration invalidates the memo so late-registered
//! serializers are picked up.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use crate::resource::Resource;
use crate::serializer::Serializer;

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

type LookupKey = (Option<SmolStr>, SmolStr);

/// A name-keyed collection of serializer definitions.
///
/// Registration keys are [`Serializer::registration_name`]s, so
/// `"PostSerializer"` and `"Post"` refer to the same entry. Reads vastly
/// outnumber writes; both tables sit behind `RwLock`s and are safe for
/// unlimited concurrent renders.
#[derive(Default)]
pub struct Registry {
    serializers: RwLock<HashMap<SmolStr, Arc<Serializer>>>,
    lookups: RwLock<HashMap<LookupKey, Option<Arc<Serializer>>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    ///
    /// Convenient for applications that define serializers once at startup.
    /// Libraries and tests that need isolation should carry their own
    /// `Arc<Registry>` instead.
    pub fn global() -> Arc<Registry> {
        GLOBAL.get_or_init(|| Arc::new(Registry::new())).clone()
    }

    /// Register a definition, replacing any previous entry under the same
    /// name. Returns the shared handle.
    pub fn register(&self, serializer: Serializer) -> Arc<Serializer> {
        let name = SmolStr::new(serializer.registration_name());
        let shared = Arc::new(serializer);
        self.serializers.write().insert(name, shared.clone());
        // Memoized misses may now resolve
        self.lookups.write().clear();
        shared
    }

    /// Fetch a definition by name.
    ///
    /// Accepts either the registered name or the suffixed form
    /// (`"Post"` / `"PostSerializer"`).
    pub fn get(&self, name: &str) -> Option<Arc<Serializer>> {
        let serializers = self.serializers.read();
        if let Some(found) = serializers.get(name) {
            return Some(found.clone());
        }
        match name.strip_suffix("Serializer") {
            Some(base) if !base.is_empty() && !base.ends_with("::") => {
                serializers.get(base).cloned()
            }
            _ => None,
        }
    }

    /// Resolve the serializer for a resource.
    ///
    /// Strategies are tried in order until one yields a definition:
    ///
    /// 1. the resource's own [`serializer_hint`](Resource::serializer_hint);
    /// 2. the caller's explicit `override_name`;
    /// 3. for the resource's type name and then each
    ///    [ancestor](Resource::ancestors), the namespace-qualified name
    ///    (`"{namespace}::{name}"`) followed by the bare name.
    ///
    /// Returns `None` when every strategy misses; callers decide whether
    /// that degrades to a virtual value or is fatal.
    pub fn lookup(
        &self,
        resource: &dyn Resource,
        override_name: Option<&str>,
        namespace: Option<&str>,
    ) -> Option<Arc<Serializer>> {
        if let Some(hint) = resource.serializer_hint() {
            if let Some(found) = self.get(hint) {
                return Some(found);
            }
        }
        if let Some(name) = override_name {
            if let Some(found) = self.get(name) {
                return Some(found);
            }
        }

        let type_name = resource.type_name();
        if let Some(found) = self.lookup_conventional(type_name, namespace) {
            return Some(found);
        }
        for ancestor in resource.ancestors() {
            if let Some(found) = self.lookup_conventional(ancestor, namespace) {
                return Some(found);
            }
        }

        debug!(
            type_name = type_name,
            namespace = namespace.unwrap_or(""),
            "no serializer found"
        );
        None
    }

    /// The memoized convention strategy for one candidate type name.
    fn lookup_conventional(
        &self,
        type_name: &str,
        namespace: Option<&str>,
    ) -> Option<Arc<Serializer>> {
        let key: LookupKey = (namespace.map(SmolStr::new), SmolStr::new(type_name));
        if let Some(memoized) = self.lookups.read().get(&key) {
            return memoized.clone();
        }

        let mut found = None;
        if let Some(ns) = namespace {
            found = self.get(&format!("{ns}::{type_name}"));
        }
        if found.is_none() {
            found = self.get(type_name);
        }

        self.lookups.write().insert(key, found.clone());
        found
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.serializers.read().len()
    }

    /// Whether no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.serializers.read().is_empty()
    }

    /// Drop every definition and memoized lookup.
    ///
    /// Test-isolation hook for suites that exercise the
    /// [global](Registry::global) registry.
    pub fn reset(&self) {
        self.serializers.write().clear();
        self.lookups.write().clear();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("serializers", &self.len())
            .field("memoized_lookups", &self.lookups.read().len())
            .finish()
    }
}
