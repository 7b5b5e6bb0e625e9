//! Errors surfaced by resources and serializer definitions.

use thiserror::Error;

/// Error raised while reading data out of a [`Resource`](crate::Resource).
///
/// Attribute readers and association readers return these; the rendering
/// engine propagates them unchanged, so a failed read aborts the render
/// rather than producing a partial document.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource has no attribute with the requested name.
    #[error("unknown attribute `{name}` on {type_name}")]
    UnknownAttribute {
        /// The attribute that was requested.
        name: String,
        /// The resource type that was asked.
        type_name: String,
    },

    /// The resource has no association with the requested name.
    #[error("unknown association `{name}` on {type_name}")]
    UnknownAssociation {
        /// The association that was requested.
        name: String,
        /// The resource type that was asked.
        type_name: String,
    },

    /// Reading the underlying data failed (I/O, lazy load, conversion).
    #[error("failed to read `{name}`: {message}")]
    ReadFailed {
        /// The attribute or association being read.
        name: String,
        /// What went wrong.
        message: String,
    },
}

impl ResourceError {
    /// Create an unknown-attribute error.
    pub fn unknown_attribute(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an unknown-association error.
    pub fn unknown_association(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownAssociation {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a read-failure error.
    pub fn read_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias for resource reads.
pub type ResourceResult<T> = Result<T, ResourceError>;
