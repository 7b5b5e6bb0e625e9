//! Attribute field descriptors.
//!
//! A [`Field`] describes one attribute of a serialized resource: its name,
//! an optional output-key override, visibility conditions, and an optional
//! custom value computation. Descriptors are built once per serializer
//! definition and shared read-only across every render.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::context::Context;
use crate::error::ResourceResult;
use crate::policy::Permitted;
use crate::value::Value;

/// Computes a field's value from the evaluation context.
pub type ValueFn = Arc<dyn Fn(&Context<'_>) -> ResourceResult<Value> + Send + Sync>;

/// Decides a field's visibility from the evaluation context.
pub type PredicateFn = Arc<dyn Fn(&Context<'_>) -> bool + Send + Sync>;

/// One attribute of a serializer definition.
///
/// # Example
///
/// ```rust
/// use portray_schema::Field;
///
/// let title = Field::new("title");
/// let byline = Field::new("byline")
///     .value(|ctx| ctx.attribute("author_name"));
/// let email = Field::new("email")
///     .when(|ctx| ctx.has_scope());
/// assert_eq!(title.output_key(), "title");
/// ```
#[derive(Clone)]
pub struct Field {
    name: SmolStr,
    key: Option<SmolStr>,
    value_fn: Option<ValueFn>,
    show_when: Option<PredicateFn>,
    hide_when: Option<PredicateFn>,
}

impl Field {
    /// Create a field read straight off the resource under `name`.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            key: None,
            value_fn: None,
            show_when: None,
            hide_when: None,
        }
    }

    /// Emit the field under a different output key.
    pub fn key(mut self, key: impl Into<SmolStr>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Compute the value with a custom function instead of reading the
    /// attribute named `name` off the resource.
    pub fn value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> ResourceResult<Value> + Send + Sync + 'static,
    {
        self.value_fn = Some(Arc::new(f));
        self
    }

    /// Show the field only while the predicate holds.
    ///
    /// When both `when` and `unless` are configured, `when` wins and
    /// `unless` is ignored.
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.show_when = Some(Arc::new(f));
        self
    }

    /// Hide the field while the predicate holds.
    pub fn unless<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.hide_when = Some(Arc::new(f));
        self
    }

    /// The declared attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key this field appears under in the output.
    pub fn output_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Whether a custom value computation is attached.
    pub fn has_custom_value(&self) -> bool {
        self.value_fn.is_some()
    }

    /// Whether this field is excluded for the given context.
    ///
    /// A field is excluded when the read policy denies its name, or its
    /// `when` predicate is false, or its `unless` predicate is true. The
    /// policy is consulted first, independent of any condition.
    pub fn excluded(&self, ctx: &Context<'_>, permitted: Option<&Permitted>) -> bool {
        if let Some(p) = permitted {
            if !p.allows(&self.name) {
                return true;
            }
        }
        if let Some(pred) = &self.show_when {
            return !pred(ctx);
        }
        if let Some(pred) = &self.hide_when {
            return pred(ctx);
        }
        false
    }

    /// Compute this field's value.
    ///
    /// Uses the custom computation when one is attached, otherwise reads
    /// the attribute through the context (which consults the cached
    /// fragment before the resource).
    pub fn value_for(&self, ctx: &Context<'_>) -> ResourceResult<Value> {
        match &self.value_fn {
            Some(f) => f(ctx),
            None => ctx.attribute(&self.name),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("custom_value", &self.value_fn.is_some())
            .field("when", &self.show_when.is_some())
            .field("unless", &self.hide_when.is_some())
            .finish()
    }
}
