//! # Portray
//!
//! Serializer-driven rendering of resource graphs.
//!
//! Portray provides:
//! - Declarative serializers: attributes, conditions, and associations in
//!   declaration order, resolved against a process-wide or local registry
//! - Include trees parsed from client strings, wildcards included
//! - Fragment caching with a single bulk store read per serialization wave
//! - Side-loaded documents: nested associations flattened into sibling
//!   arrays for client-side graph reconstruction
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use portray::prelude::*;
//!
//! struct Post {
//!     id: i64,
//!     title: String,
//! }
//!
//! impl Resource for Post {
//!     fn type_name(&self) -> &str {
//!         "Post"
//!     }
//!
//!     fn attribute(&self, name: &str) -> ResourceResult<Value> {
//!         match name {
//!             "id" => Ok(Value::Int(self.id)),
//!             "title" => Ok(self.title.clone().into()),
//!             _ => Err(ResourceError::unknown_attribute(name, "Post")),
//!         }
//!     }
//!
//!     fn related(&self, name: &str) -> ResourceResult<Related> {
//!         Err(ResourceError::unknown_association(name, "Post"))
//!     }
//! }
//!
//! let registry = Arc::new(Registry::new());
//! registry.register(Serializer::new("PostSerializer").attrs(["id", "title"]));
//!
//! let post = Arc::new(Post { id: 1, title: "Hello".to_string() });
//! let doc = Renderer::with_registry(registry).render(post).unwrap();
//!
//! assert_eq!(
//!     doc.to_json().unwrap(),
//!     r#"{"post":{"id":1,"title":"Hello"}}"#
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Serializer definitions: resources, fields, associations, policies, and
/// the registry.
pub mod schema {
    pub use portray_schema::*;
}

/// The rendering runtime: include trees, the attributes engine, fragment
/// caching, and document shaping.
pub mod render {
    pub use portray_render::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::render::{
        Document, IncludeTree, Input, PageInfo, Paginated, RenderError, RenderResult, Renderer,
    };
    pub use crate::schema::{
        Association, Context, Field, Registry, Related, Resource, ResourceError, ResourceRef,
        ResourceResult, Serializer, Value, ValueMap,
    };
}

// Re-export key types at the crate root
pub use render::{Document, IncludeTree, RenderError, RenderResult, Renderer};
pub use schema::{Registry, Resource, Serializer, Value};
