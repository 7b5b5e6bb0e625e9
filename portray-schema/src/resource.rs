//! The boundary between application data and the serializer machinery.
//!
//! Serializers never see concrete application types. They see [`Resource`]s:
//! a uniform, dynamically-typed view that exposes identity, named attribute
//! reads, and named association reads. Anything that can answer those
//! questions can be serialized, whether it is an ORM row, a plain struct, or
//! a hash-like test double.

use std::fmt;
use std::sync::Arc;

use crate::error::ResourceResult;
use crate::value::Value;

/// Shared handle to a serializable resource.
pub type ResourceRef = Arc<dyn Resource>;

/// A serializable piece of application data.
///
/// Implementations must be cheap to query repeatedly: the engine may read
/// the same attribute more than once across cache-key computation and
/// rendering.
pub trait Resource: Send + Sync {
    /// The resource's type name, e.g. `"Post"`.
    ///
    /// Used for serializer lookup and root-key derivation.
    fn type_name(&self) -> &str;

    /// Read a named attribute.
    fn attribute(&self, name: &str) -> ResourceResult<Value>;

    /// Read a named association.
    fn related(&self, name: &str) -> ResourceResult<Related>;

    /// An explicit serializer name for this resource, if it carries one.
    ///
    /// Takes precedence over every lookup strategy. Most resources return
    /// `None` and let the registry derive the serializer from
    /// [`type_name`](Self::type_name).
    fn serializer_hint(&self) -> Option<&str> {
        None
    }

    /// Supertype names to try when no serializer is registered for
    /// [`type_name`](Self::type_name), most-derived first.
    ///
    /// Lets `GuestUser` fall back to a `User` serializer.
    fn ancestors(&self) -> Vec<&str> {
        Vec::new()
    }

    /// A stable identity for fragment caching, e.g. `"17"` or the
    /// versioned form `"17-20250104120000"` when freshness matters.
    ///
    /// Resources returning `None` are never cached.
    fn cache_id(&self) -> Option<String> {
        None
    }

    /// A plain-value rendition of this resource, used when no serializer
    /// can be found for it (heterogeneous collections, scalar-ish wrappers).
    ///
    /// Returning `None` means the resource has no such fallback: a lone
    /// association target then renders without data, and a collection
    /// member renders as `Null`.
    fn as_value(&self) -> Option<Value> {
        None
    }
}

/// The result of reading an association off a resource.
#[derive(Clone)]
pub enum Related {
    /// The association is absent (`nil` to-one, unloaded, etc).
    None,
    /// A single related resource.
    One(ResourceRef),
    /// A collection of related resources.
    Many(Vec<ResourceRef>),
    /// Pre-shaped data that should be emitted verbatim, bypassing
    /// serializer lookup entirely.
    Raw(Value),
}

impl Related {
    /// Whether this is `Related::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of resources carried: 0, 1, or the collection length.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
            Self::Raw(_) => 0,
        }
    }

    /// Whether no resources are carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Related {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "Related::None"),
            Self::One(r) => write!(f, "Related::One({})", r.type_name()),
            Self::Many(items) => write!(f, "Related::Many(len={})", items.len()),
            Self::Raw(v) => write!(f, "Related::Raw({v:?})"),
        }
    }
}

impl From<Option<ResourceRef>> for Related {
    fn from(v: Option<ResourceRef>) -> Self {
        match v {
            Some(r) => Self::One(r),
            None => Self::None,
        }
    }
}

impl From<Vec<ResourceRef>> for Related {
    fn from(v: Vec<ResourceRef>) -> Self {
        Self::Many(v)
    }
}
