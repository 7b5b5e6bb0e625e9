//! Association descriptors.
//!
//! An [`Association`] is a [`Field`] that points at other resources instead
//! of a scalar: it adds the to-one/to-many arity, an optional explicit child
//! serializer, link and meta builders, the include-data switch, and the
//! side-loading marker consumed by the flattening adapter.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::context::Context;
use crate::error::ResourceResult;
use crate::field::{Field, ValueFn};
use crate::policy::Permitted;
use crate::resource::Related;
use crate::value::Value;

/// Computes an association's target from the evaluation context.
pub type RelatedFn = Arc<dyn Fn(&Context<'_>) -> ResourceResult<Related> + Send + Sync>;

/// Arity of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Points at a single resource (`has_one` / `belongs_to` style).
    One,
    /// Points at an ordered collection (`has_many` style).
    Many,
}

/// A link or meta entry: either a literal value or a computation evaluated
/// against the parent resource's context.
#[derive(Clone)]
pub enum Computable {
    /// Emitted verbatim.
    Literal(Value),
    /// Evaluated per render.
    Computed(ValueFn),
}

impl Computable {
    /// Resolve to a concrete value for one render.
    pub fn resolve(&self, ctx: &Context<'_>) -> ResourceResult<Value> {
        match self {
            Self::Literal(v) => Ok(v.clone()),
            Self::Computed(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Computable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One association of a serializer definition.
///
/// # Example
///
/// ```rust
/// use portray_schema::Association;
///
/// let author = Association::one("author");
/// let comments = Association::many("comments")
///     .serializer("Comment")
///     .embed_in_root();
/// let likes = Association::many("likes")
///     .include_data(false)
///     .link("related", "/posts/1/likes");
/// assert!(comments.embedded_in_root());
/// ```
#[derive(Clone)]
pub struct Association {
    field: Field,
    kind: AssociationKind,
    serializer: Option<SmolStr>,
    include_data: bool,
    embed_in_root: bool,
    related_fn: Option<RelatedFn>,
    links: IndexMap<SmolStr, Computable>,
    meta: Option<Computable>,
}

impl Association {
    fn new(name: impl Into<SmolStr>, kind: AssociationKind) -> Self {
        Self {
            field: Field::new(name),
            kind,
            serializer: None,
            include_data: true,
            embed_in_root: false,
            related_fn: None,
            links: IndexMap::new(),
            meta: None,
        }
    }

    /// Declare a to-one association.
    pub fn one(name: impl Into<SmolStr>) -> Self {
        Self::new(name, AssociationKind::One)
    }

    /// Declare a to-many association.
    pub fn many(name: impl Into<SmolStr>) -> Self {
        Self::new(name, AssociationKind::Many)
    }

    /// Emit the association under a different output key.
    pub fn key(mut self, key: impl Into<SmolStr>) -> Self {
        self.field = self.field.key(key);
        self
    }

    /// Force a specific child serializer by registered name, bypassing
    /// lookup.
    pub fn serializer(mut self, name: impl Into<SmolStr>) -> Self {
        self.serializer = Some(name.into());
        self
    }

    /// Whether the association's data is serialized at all.
    ///
    /// With `false`, links and meta still render but no child serializer is
    /// built and no data key appears.
    pub fn include_data(mut self, include: bool) -> Self {
        self.include_data = include;
        self
    }

    /// Mark the association for side-loading: the flattening adapter moves
    /// its serialized values into a sibling array under the document root.
    pub fn embed_in_root(mut self) -> Self {
        self.embed_in_root = true;
        self
    }

    /// Show the association only while the predicate holds.
    ///
    /// Same precedence rule as fields: `when` wins over `unless`.
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.field = self.field.when(f);
        self
    }

    /// Hide the association while the predicate holds.
    pub fn unless<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.field = self.field.unless(f);
        self
    }

    /// Resolve the target with a custom function instead of reading the
    /// association named `name` off the resource.
    pub fn related<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> ResourceResult<Related> + Send + Sync + 'static,
    {
        self.related_fn = Some(Arc::new(f));
        self
    }

    /// Attach a literal link.
    pub fn link(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.links.insert(name.into(), Computable::Literal(value.into()));
        self
    }

    /// Attach a computed link, evaluated against the parent's context.
    pub fn link_with<F>(mut self, name: impl Into<SmolStr>, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> ResourceResult<Value> + Send + Sync + 'static,
    {
        self.links
            .insert(name.into(), Computable::Computed(Arc::new(f)));
        self
    }

    /// Attach literal metadata.
    pub fn meta(mut self, value: impl Into<Value>) -> Self {
        self.meta = Some(Computable::Literal(value.into()));
        self
    }

    /// Attach computed metadata, evaluated against the parent's context.
    pub fn meta_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> ResourceResult<Value> + Send + Sync + 'static,
    {
        self.meta = Some(Computable::Computed(Arc::new(f)));
        self
    }

    /// The declared association name.
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// The key this association appears under in the output.
    pub fn output_key(&self) -> &str {
        self.field.output_key()
    }

    /// The association's arity.
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Whether this is a to-many association.
    pub fn is_many(&self) -> bool {
        self.kind == AssociationKind::Many
    }

    /// The explicit child serializer name, if one was forced.
    pub fn serializer_name(&self) -> Option<&str> {
        self.serializer.as_deref()
    }

    /// Whether association data is serialized.
    pub fn includes_data(&self) -> bool {
        self.include_data
    }

    /// Whether the flattening adapter side-loads this association.
    pub fn embedded_in_root(&self) -> bool {
        self.embed_in_root
    }

    /// Declared links, in declaration order.
    pub fn links(&self) -> &IndexMap<SmolStr, Computable> {
        &self.links
    }

    /// Declared metadata, if any.
    pub fn meta_entry(&self) -> Option<&Computable> {
        self.meta.as_ref()
    }

    /// Whether any links or meta are configured.
    pub fn has_links_or_meta(&self) -> bool {
        !self.links.is_empty() || self.meta.is_some()
    }

    /// Whether this association is excluded for the given context.
    pub fn excluded(&self, ctx: &Context<'_>, permitted: Option<&Permitted>) -> bool {
        self.field.excluded(ctx, permitted)
    }

    /// Resolve the association target for one render.
    pub fn related_for(&self, ctx: &Context<'_>) -> ResourceResult<Related> {
        match &self.related_fn {
            Some(f) => f(ctx),
            None => ctx.related(self.name()),
        }
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Association")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("serializer", &self.serializer)
            .field("include_data", &self.include_data)
            .field("embed_in_root", &self.embed_in_root)
            .field("links", &self.links.len())
            .field("meta", &self.meta.is_some())
            .finish()
    }
}
