//! # portray-render
//!
//! The rendering runtime for portray.
//!
//! This crate turns serializer definitions from `portray-schema` into
//! output documents, including:
//! - Include trees parsed from client strings (`"comments.author,tags"`)
//! - A recursive attributes engine with declaration-order output
//! - Fragment caching with one bulk store read per serialization wave
//! - Root-key derivation and side-loaded flattening for client-side graph
//!   reconstruction
//! - Pagination metadata carried on a side channel, never in the body
//!
//! ## Rendering
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use portray_render::Renderer;
//! use portray_schema::{
//!     Registry, Related, Resource, ResourceError, ResourceResult, Serializer, Value,
//! };
//!
//! struct Post {
//!     id: i64,
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
//! registry.register(Serializer::new("PostSerializer").attr("id"));
//!
//! let doc = Renderer::with_registry(registry)
//!     .render(Arc::new(Post { id: 1 }))
//!     .unwrap();
//! assert_eq!(doc.to_json().unwrap(), r#"{"post":{"id":1}}"#);
//! ```
//!
//! ## Include trees
//!
//! ```rust
//! use portray_render::IncludeTree;
//!
//! let tree = IncludeTree::parse("comments.author,tags");
//! assert!(tree.includes("comments"));
//! assert!(tree.child("comments").includes("author"));
//! assert!(!tree.includes("author"));
//! ```

mod adapter;
mod association;
mod engine;

pub mod cache;
pub mod error;
pub mod include;
pub mod logging;
pub mod pagination;
pub mod renderer;

pub use cache::{CacheKey, CacheStore, FragmentWave, MemoryStore, NullStore};
pub use error::{RenderError, RenderResult};
pub use include::IncludeTree;
pub use pagination::{PageInfo, Paginated};
pub use renderer::{Document, Input, Renderer};
