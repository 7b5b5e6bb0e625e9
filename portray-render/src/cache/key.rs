//! Fragment cache keys.

use std::fmt::{self, Display};

use smol_str::SmolStr;

/// Identifies one resource's cached fragment under one include shape.
///
/// Keys are structured as `prefix:identity:shape`: the serializer's cache
/// prefix, the resource's stable identity, and the include-tree shape
/// digest. The shape component keeps the same resource cached under
/// different include depths from colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The serializer's cache prefix (short name unless overridden).
    prefix: SmolStr,
    /// The resource's stable identity, freshness stamp included.
    identity: String,
    /// Digest of the include shape applied to the resource.
    shape: u64,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(prefix: impl Into<SmolStr>, identity: impl Into<String>, shape: u64) -> Self {
        Self {
            prefix: prefix.into(),
            identity: identity.into(),
            shape,
        }
    }

    /// Get the full key string.
    pub fn as_str(&self) -> String {
        format!("{}:{}:{:016x}", self.prefix, self.identity, self.shape)
    }

    /// Get the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the identity component.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the include-shape digest.
    pub fn shape(&self) -> u64 {
        self.shape
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
