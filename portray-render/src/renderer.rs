//! The top-level renderer.
//!
//! One `Renderer` owns everything a render call needs: the registry to
//! resolve serializers from, the optional cache store, policy, scope,
//! params, and the include tree. It runs the attributes engine over the
//! input, wraps the result under a derived root key, flattens side-loaded
//! associations into sibling arrays, and carries pagination metadata on a
//! side channel instead of mixing it into the body.
//!
//! Serializer-lookup misses are fatal here, unlike inside association
//! resolution: a top-level resource that nothing knows how to render is a
//! caller error, not a degradable edge.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use portray_schema::{ReadPolicy, Registry, Resource, ResourceRef, Serializer, Value, ValueMap};
use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::debug;

use crate::adapter;
use crate::cache::CacheStore;
use crate::engine::{self, Pass};
use crate::error::{RenderError, RenderResult};
use crate::include::IncludeTree;
use crate::pagination::{PageInfo, Paginated};

/// What a render call receives: one resource, a collection, or a
/// collection with page metadata.
pub enum Input {
    /// A single resource.
    One(ResourceRef),
    /// A collection of resources.
    Many(Vec<ResourceRef>),
    /// A collection plus pagination metadata for the side channel.
    Paged(Vec<ResourceRef>, PageInfo),
}

impl Input {
    /// Collection input with explicit page metadata.
    pub fn paged(resources: Vec<ResourceRef>, page: PageInfo) -> Self {
        Input::Paged(resources, page)
    }

    /// Collection input with page metadata taken from a paginated source.
    pub fn paginated<P: Paginated>(source: &P, resources: Vec<ResourceRef>) -> Self {
        Input::Paged(resources, source.page_info())
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(r) => write!(f, "Input::One({})", r.type_name()),
            Self::Many(items) => write!(f, "Input::Many(len={})", items.len()),
            Self::Paged(items, page) => {
                write!(f, "Input::Paged(len={}, page={})", items.len(), page.current_page)
            }
        }
    }
}

impl From<ResourceRef> for Input {
    fn from(resource: ResourceRef) -> Self {
        Input::One(resource)
    }
}

impl<T: Resource + 'static> From<Arc<T>> for Input {
    fn from(resource: Arc<T>) -> Self {
        Input::One(resource)
    }
}

impl From<Vec<ResourceRef>> for Input {
    fn from(resources: Vec<ResourceRef>) -> Self {
        Input::Many(resources)
    }
}

impl<T: Resource + 'static> From<Vec<Arc<T>>> for Input {
    fn from(resources: Vec<Arc<T>>) -> Self {
        Input::Many(resources.into_iter().map(|r| r as ResourceRef).collect())
    }
}

/// A rendered document: the root-keyed body plus side-channel metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The body, wrapped under its root key, side-loaded siblings included.
    pub body: ValueMap,
    /// Pagination (or other) metadata kept out of the body.
    pub meta: Option<Value>,
}

impl Document {
    /// Body and metadata combined into one value, metadata under `"meta"`.
    pub fn to_value(&self) -> Value {
        let mut map = self.body.clone();
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), meta.clone());
        }
        Value::Map(map)
    }

    /// JSON-encode [`to_value`](Self::to_value).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_value())
    }
}

/// Fluent entry point for rendering resource graphs.
#[derive(Clone)]
pub struct Renderer {
    registry: Arc<Registry>,
    store: Option<Arc<dyn CacheStore>>,
    policy: Option<Arc<dyn ReadPolicy>>,
    scope: Option<Arc<dyn Any + Send + Sync>>,
    params: ValueMap,
    namespace: Option<SmolStr>,
    default_root: Option<SmolStr>,
    serializer: Option<SmolStr>,
    include: IncludeTree,
}

impl Renderer {
    /// A renderer over the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }

    /// A renderer over an explicit registry. Tests and multi-tenant setups
    /// use this for isolation.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            store: None,
            policy: None,
            scope: None,
            params: ValueMap::new(),
            namespace: None,
            default_root: None,
            serializer: None,
            include: IncludeTree::one_level(),
        }
    }

    /// Attach a fragment-cache store.
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a read policy consulted for every field.
    pub fn policy(mut self, policy: Arc<dyn ReadPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attach an opaque scope (current user, tenant) visible to value
    /// rules and conditions.
    pub fn scope(mut self, scope: Arc<dyn Any + Send + Sync>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Add one render parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all render parameters.
    pub fn params(mut self, params: ValueMap) -> Self {
        self.params = params;
        self
    }

    /// Set the lookup namespace (`"api"` makes `Post` resolve through
    /// `api::Post` first).
    pub fn namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the fallback root key used when no name can be derived.
    pub fn root(mut self, key: impl Into<SmolStr>) -> Self {
        self.default_root = Some(key.into());
        self
    }

    /// Force a serializer by name instead of registry convention.
    pub fn serializer(mut self, name: impl Into<SmolStr>) -> Self {
        self.serializer = Some(name.into());
        self
    }

    /// Set the include tree. Accepts a parsed tree or a spec string
    /// (`"comments.author,tags"`). Defaults to one level, no recursion.
    pub fn include(mut self, include: impl Into<IncludeTree>) -> Self {
        self.include = include.into();
        self
    }

    /// Render a root-keyed document.
    pub fn render(&self, input: impl Into<Input>) -> RenderResult<Document> {
        let pass = self.pass();
        match input.into() {
            Input::One(resource) => {
                let serializer = self.resolve(resource.as_ref())?;
                let body =
                    engine::render_single(&pass, &serializer, resource.as_ref(), &self.include)?;
                let root = adapter::root_key(
                    Some(&serializer),
                    Some(resource.as_ref()),
                    self.default_root.as_deref(),
                    false,
                );

                let mut document = ValueMap::new();
                document.insert(root.clone(), Value::Map(body));
                adapter::flatten_into(&mut document, &root, &serializer.embedded_root_keys());
                debug!(root = %root, "rendered resource");
                Ok(Document { body: document, meta: None })
            }
            Input::Many(resources) => self.collection_document(&pass, resources, None),
            Input::Paged(resources, page) => {
                let meta = Some(page.to_value());
                self.collection_document(&pass, resources, meta)
            }
        }
    }

    /// Render without the document shaping: no root key, no side-loading,
    /// no metadata. A single resource yields its map, a collection its
    /// array. Useful for embedding output inside a larger document.
    pub fn render_bare(&self, input: impl Into<Input>) -> RenderResult<Value> {
        let pass = self.pass();
        match input.into() {
            Input::One(resource) => {
                let serializer = self.resolve(resource.as_ref())?;
                engine::render_single(&pass, &serializer, resource.as_ref(), &self.include)
                    .map(Value::Map)
            }
            Input::Many(resources) | Input::Paged(resources, _) => {
                let members = self.members(resources)?;
                engine::render_collection(&pass, &members, &self.include).map(Value::Array)
            }
        }
    }

    fn collection_document(
        &self,
        pass: &Pass<'_>,
        resources: Vec<ResourceRef>,
        meta: Option<Value>,
    ) -> RenderResult<Document> {
        let members = self.members(resources)?;

        // Root key follows the first member; an empty collection falls
        // back to the forced serializer's name, then the default
        let root = match members.first() {
            Some((serializer, resource)) => adapter::root_key(
                Some(serializer.as_ref()),
                Some(resource.as_ref()),
                self.default_root.as_deref(),
                true,
            ),
            None => {
                let named = self
                    .serializer
                    .as_deref()
                    .and_then(|name| self.registry.get(name));
                adapter::root_key(named.as_deref(), None, self.default_root.as_deref(), true)
            }
        };

        let values = engine::render_collection(pass, &members, &self.include)?;

        let mut sideload: SmallVec<[&str; 4]> = SmallVec::new();
        for (serializer, _) in &members {
            for key in serializer.embedded_root_keys() {
                if !sideload.contains(&key) {
                    sideload.push(key);
                }
            }
        }

        let mut document = ValueMap::new();
        document.insert(root.clone(), Value::Array(values));
        adapter::flatten_into(&mut document, &root, &sideload);
        debug!(root = %root, members = members.len(), "rendered collection");
        Ok(Document { body: document, meta })
    }

    /// Resolve every member's serializer up front; any miss is fatal at
    /// the top level.
    fn members(
        &self,
        resources: Vec<ResourceRef>,
    ) -> RenderResult<Vec<(Arc<Serializer>, ResourceRef)>> {
        let mut members = Vec::with_capacity(resources.len());
        for resource in resources {
            let serializer = self.resolve(resource.as_ref())?;
            members.push((serializer, resource));
        }
        Ok(members)
    }

    fn resolve(&self, resource: &dyn Resource) -> RenderResult<Arc<Serializer>> {
        self.registry
            .lookup(resource, self.serializer.as_deref(), self.namespace.as_deref())
            .ok_or_else(|| RenderError::no_serializer(resource.type_name()))
    }

    fn pass(&self) -> Pass<'_> {
        Pass {
            registry: &self.registry,
            store: self.store.as_deref(),
            policy: self.policy.as_deref(),
            scope: self.scope.as_deref(),
            params: (!self.params.is_empty()).then_some(&self.params),
            namespace: self.namespace.as_deref(),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
