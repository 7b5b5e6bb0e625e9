//! # portray-schema
//!
//! Serializer definitions for portray.
//!
//! This crate provides:
//! - The [`Value`] document vocabulary (ordered maps, arrays, scalars)
//! - The [`Resource`] boundary trait between application data and rendering
//! - [`Field`] and [`Association`] descriptors with conditions, custom
//!   values, links and metadata
//! - [`Serializer`] definitions with fragment-cache configuration
//! - The [`Registry`] that resolves resources to serializers through an
//!   ordered list of lookup strategies
//!
//! ## Example
//!
//! ```rust
//! use portray_schema::{Association, Field, Registry, Serializer};
//!
//! let registry = Registry::new();
//! registry.register(
//!     Serializer::new("PostSerializer")
//!         .attr("id")
//!         .attr("title")
//!         .association(Association::one("author"))
//!         .association(Association::many("comments").embed_in_root()),
//! );
//!
//! assert!(registry.get("Post").is_some());
//! ```

pub mod association;
pub mod context;
pub mod error;
pub mod field;
pub mod policy;
pub mod registry;
pub mod resource;
pub mod serializer;
pub mod value;

pub use association::{Association, AssociationKind, Computable, RelatedFn};
pub use context::Context;
pub use error::{ResourceError, ResourceResult};
pub use field::{Field, PredicateFn, ValueFn};
pub use policy::{AllowList, Permitted, ReadPolicy};
pub use registry::Registry;
pub use resource::{Related, Resource, ResourceRef};
pub use serializer::{CacheConfig, Serializer};
pub use value::{Value, ValueMap};
