//! Read-policy capability.
//!
//! Authorization stays outside this crate; serialization only consumes a
//! policy's *decision* about which fields a caller may read. A policy is an
//! optional capability: not configuring one, or a policy declining to answer
//! for a namespace, both mean "unrestricted".

use std::collections::HashSet;

/// A policy's answer for one serialization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permitted {
    /// Every field may be read.
    All,
    /// Only the named fields may be read.
    Only(HashSet<String>),
}

impl Permitted {
    /// Build an allow-list answer.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    /// Whether the named field may be read.
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(name),
        }
    }
}

/// Supplies per-namespace read permissions.
///
/// Returning `None` means the policy has no opinion for that namespace,
/// which is equivalent to [`Permitted::All`]. Policies therefore never have
/// to distinguish "unknown namespace" from "everything allowed".
pub trait ReadPolicy: Send + Sync {
    /// Which attributes may be read in the given namespace.
    fn permitted_attributes(&self, namespace: Option<&str>) -> Option<Permitted>;
}

/// A fixed allow-list, the simplest useful [`ReadPolicy`].
///
/// Ignores the namespace; every pass gets the same set.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    /// Create an allow-list from field names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ReadPolicy for AllowList {
    fn permitted_attributes(&self, _namespace: Option<&str>) -> Option<Permitted> {
        Some(Permitted::Only(self.names.clone()))
    }
}
