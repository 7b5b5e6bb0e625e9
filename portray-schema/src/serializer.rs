//! Serializer definitions.
//!
//! A [`Serializer`] is the static description of how one resource type is
//! rendered: its ordered attributes, its ordered associations, an optional
//! root-key override, and the fragment-cache configuration. Definitions are
//! built once at startup, registered, and shared read-only behind an `Arc`
//! for the life of the process.

use smol_str::SmolStr;

use crate::association::Association;
use crate::field::Field;

/// Fragment-cache settings for one serializer.
///
/// Presence of a `CacheConfig` is what marks a serializer's resources as
/// cacheable at all; `only` / `except` narrow which attributes a cached
/// fragment may serve (everything outside the set is always computed
/// fresh).
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    key_prefix: Option<SmolStr>,
    only: Option<Vec<SmolStr>>,
    except: Option<Vec<SmolStr>>,
}

impl CacheConfig {
    /// Cache every attribute under the default key prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the cache-key prefix (defaults to the serializer's short
    /// name).
    pub fn key_prefix(mut self, prefix: impl Into<SmolStr>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Restrict fragments to the named attributes.
    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude the named attributes from fragments.
    pub fn except<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.except = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// The configured key prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Whether a fragment may serve the named attribute.
    pub fn covers(&self, name: &str) -> bool {
        if let Some(only) = &self.only {
            if !only.iter().any(|n| n == name) {
                return false;
            }
        }
        if let Some(except) = &self.except {
            if except.iter().any(|n| n == name) {
                return false;
            }
        }
        true
    }
}

/// The immutable definition of how one resource type serializes.
///
/// # Example
///
/// ```rust
/// use portray_schema::{Association, CacheConfig, Field, Serializer};
///
/// let posts = Serializer::new("PostSerializer")
///     .attr("id")
///     .attr("title")
///     .attribute(Field::new("body").unless(|ctx| ctx.param("summary").is_some()))
///     .association(Association::one("author"))
///     .association(Association::many("comments").embed_in_root())
///     .cache(CacheConfig::new().except(["body"]));
///
/// assert_eq!(posts.short_name(), "Post");
/// assert_eq!(posts.registration_name(), "Post");
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
    type_name: SmolStr,
    root_key: Option<SmolStr>,
    attributes: Vec<Field>,
    associations: Vec<Association>,
    cache: Option<CacheConfig>,
}

impl Serializer {
    /// Start a definition for the given type name.
    ///
    /// The name is conventionally the serializer type (`"PostSerializer"`)
    /// or the bare resource type (`"Post"`); a trailing `Serializer` suffix
    /// is ignored everywhere names are compared. Namespaces use `::`
    /// segments (`"api::PostSerializer"`).
    pub fn new(type_name: impl Into<SmolStr>) -> Self {
        Self {
            type_name: type_name.into(),
            root_key: None,
            attributes: Vec::new(),
            associations: Vec::new(),
            cache: None,
        }
    }

    /// Override the derived root key.
    pub fn root_key(mut self, key: impl Into<SmolStr>) -> Self {
        self.root_key = Some(key.into());
        self
    }

    /// Append an attribute. Declaration order is output order.
    pub fn attribute(mut self, field: Field) -> Self {
        self.attributes.push(field);
        self
    }

    /// Append a plain attribute read off the resource under `name`.
    pub fn attr(self, name: impl Into<SmolStr>) -> Self {
        self.attribute(Field::new(name))
    }

    /// Append several plain attributes.
    pub fn attrs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        for name in names {
            self.attributes.push(Field::new(name));
        }
        self
    }

    /// Append an association. Associations always follow attributes in the
    /// output, each group in declaration order.
    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Enable fragment caching for this serializer's resources.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = Some(config);
        self
    }

    /// The full declared type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The name this definition registers under: the type name with a
    /// trailing `Serializer` suffix stripped (`"api::PostSerializer"` →
    /// `"api::Post"`).
    pub fn registration_name(&self) -> &str {
        match self.type_name.strip_suffix("Serializer") {
            Some(base) if !base.is_empty() && !base.ends_with("::") => base,
            _ => &self.type_name,
        }
    }

    /// The short name used for root-key derivation: the last `::` segment
    /// of [`registration_name`](Self::registration_name).
    pub fn short_name(&self) -> &str {
        let name = self.registration_name();
        name.rsplit("::").next().unwrap_or(name)
    }

    /// The explicit root-key override, if any.
    pub fn root_key_override(&self) -> Option<&str> {
        self.root_key.as_deref()
    }

    /// Declared attributes, in declaration order.
    pub fn attributes(&self) -> &[Field] {
        &self.attributes
    }

    /// Declared associations, in declaration order.
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// The fragment-cache settings, if caching is enabled.
    pub fn cache_config(&self) -> Option<&CacheConfig> {
        self.cache.as_ref()
    }

    /// Whether this serializer's resources participate in fragment caching.
    pub fn is_cacheable(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether a cached fragment may serve the named attribute.
    pub fn cacheable_attribute(&self, name: &str) -> bool {
        self.cache.as_ref().is_some_and(|c| c.covers(name))
    }

    /// The cache-key prefix: the configured override or the short name.
    pub fn cache_prefix(&self) -> &str {
        self.cache
            .as_ref()
            .and_then(CacheConfig::prefix)
            .unwrap_or_else(|| self.short_name())
    }

    /// Output keys of associations marked for side-loading, in declaration
    /// order.
    pub fn embedded_root_keys(&self) -> Vec<&str> {
        self.associations
            .iter()
            .filter(|a| a.embedded_in_root())
            .map(Association::output_key)
            .collect()
    }
}
