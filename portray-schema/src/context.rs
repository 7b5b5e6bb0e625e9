//! Per-resource evaluation context.
//!
//! Field conditions and virtual values are plain functions; everything they
//! may consult is handed to them explicitly through a [`Context`]. This keeps
//! serializer definitions free of hidden state: a condition can look at the
//! resource, the authorization scope, and the render parameters, and nothing
//! else.

use std::any::Any;

use crate::error::ResourceResult;
use crate::resource::{Related, Resource};
use crate::value::{Value, ValueMap};

/// Everything a field condition or virtual value can see while one resource
/// is being serialized.
///
/// Borrowed for the duration of a single field evaluation; cheap to copy.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    resource: &'a dyn Resource,
    scope: Option<&'a (dyn Any + Send + Sync)>,
    params: Option<&'a ValueMap>,
    fragment: Option<&'a ValueMap>,
}

impl<'a> Context<'a> {
    /// Create a context for a resource with no scope and no parameters.
    pub fn new(resource: &'a dyn Resource) -> Self {
        Self {
            resource,
            scope: None,
            params: None,
            fragment: None,
        }
    }

    /// Attach an authorization scope (typically the current user).
    pub fn with_scope(mut self, scope: &'a (dyn Any + Send + Sync)) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Attach render parameters.
    pub fn with_params(mut self, params: &'a ValueMap) -> Self {
        self.params = Some(params);
        self
    }

    /// Attach a cached fragment that answers attribute reads before the
    /// resource is consulted.
    pub fn with_fragment(mut self, fragment: &'a ValueMap) -> Self {
        self.fragment = Some(fragment);
        self
    }

    /// The resource being serialized.
    pub fn resource(&self) -> &'a dyn Resource {
        self.resource
    }

    /// Read an attribute, delegating to the cached fragment first.
    ///
    /// When a fragment is attached and holds the requested name, the cached
    /// value is returned without touching the resource at all. Reads that
    /// miss the fragment fall through to the resource.
    pub fn attribute(&self, name: &str) -> ResourceResult<Value> {
        if let Some(fragment) = self.fragment {
            if let Some(cached) = fragment.get(name) {
                return Ok(cached.clone());
            }
        }
        self.resource.attribute(name)
    }

    /// Read an association off the resource.
    pub fn related(&self, name: &str) -> ResourceResult<Related> {
        self.resource.related(name)
    }

    /// Downcast the scope to a concrete type.
    ///
    /// Returns `None` when no scope was attached or the type does not match.
    pub fn scope<T: Any>(&self) -> Option<&'a T> {
        self.scope.and_then(|s| s.downcast_ref::<T>())
    }

    /// Whether any scope was attached.
    pub fn has_scope(&self) -> bool {
        self.scope.is_some()
    }

    /// Look up a render parameter by key.
    pub fn param(&self, key: &str) -> Option<&'a Value> {
        self.params.and_then(|p| p.get(key))
    }

    /// All render parameters, if any were attached.
    pub fn params(&self) -> Option<&'a ValueMap> {
        self.params
    }
}
