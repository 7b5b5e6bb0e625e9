//! Rendering errors.
//!
//! Almost nothing in this crate is fatal. A serializer-lookup miss on an
//! association degrades to a virtual value, and an absent cache store or
//! policy answer just means fresh computation and unrestricted reads. The
//! two exceptions are a top-level resource nothing can serialize, and
//! resource reads that fail; those pass through unmodified, since the
//! resource boundary owns them.

use portray_schema::ResourceError;
use thiserror::Error;

/// Error raised by a render call.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No serializer could be resolved for the top-level resource.
    #[error("no serializer registered for `{type_name}`")]
    NoSerializer {
        /// The type name every lookup strategy missed on.
        type_name: String,
    },

    /// A resource attribute or association read failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl RenderError {
    /// Create a no-serializer error.
    pub fn no_serializer(type_name: impl Into<String>) -> Self {
        Self::NoSerializer {
            type_name: type_name.into(),
        }
    }
}

/// Result alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
