//! Include-tree parsing and traversal.
//!
//! A request names which associations to expand as comma-separated dotted
//! paths (`"comments.author,tags"`). Parsing produces a prefix tree that
//! the engine consults at every level: "is this association included
//! here?" and "what sub-tree applies below it?".
//!
//! The wildcard token `*` includes every association name. As a final
//! segment it is pushed down without bound (`"*"`: a child of a wildcard
//! node is itself a wildcard node), while `"*.rest"` narrows every child to
//! the parsed remainder. Specific paths always override the wildcard for
//! their name. An empty or absent spec includes everything exactly one
//! level deep.
//!
//! There are no parse errors: malformed segments are kept as literal,
//! unmatchable association names.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use indexmap::IndexMap;
use smol_str::SmolStr;

static EMPTY: LazyLock<IncludeTree> = LazyLock::new(IncludeTree::none);

/// How a node treats association names it has no specific child for.
#[derive(Debug, Clone, PartialEq)]
enum Wildcard {
    /// `*` as a final segment: every name matches at every depth below.
    Deep,
    /// `*.rest`: every name matches at this level, each child narrowed to
    /// the parsed remainder.
    Narrowed(Box<IncludeTree>),
}

/// One node of a parsed include request.
///
/// # Example
///
/// ```rust
/// use portray_render::IncludeTree;
///
/// let tree = IncludeTree::parse("comments.author,tags");
/// assert!(tree.includes("comments"));
/// assert!(tree.includes("tags"));
/// assert!(!tree.includes("author"));
/// assert!(tree.child("comments").includes("author"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeTree {
    children: IndexMap<SmolStr, IncludeTree>,
    wildcard: Option<Wildcard>,
}

impl IncludeTree {
    /// A node matching no association at all.
    pub fn none() -> Self {
        Self {
            children: IndexMap::new(),
            wildcard: None,
        }
    }

    /// Include every association exactly one level deep.
    ///
    /// This is the default for an empty or absent include spec.
    pub fn one_level() -> Self {
        Self {
            children: IndexMap::new(),
            wildcard: Some(Wildcard::Narrowed(Box::new(Self::none()))),
        }
    }

    /// Include every association at every depth (the `"*"` spec).
    pub fn all() -> Self {
        Self {
            children: IndexMap::new(),
            wildcard: Some(Wildcard::Deep),
        }
    }

    /// Parse a comma-separated list of dotted include paths.
    ///
    /// Empty input (or input that is all separators) yields
    /// [`one_level`](Self::one_level).
    pub fn parse(spec: &str) -> Self {
        Self::from_paths(spec.split(','))
    }

    /// Build a tree from pre-split include paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::none();
        let mut any = false;
        for path in paths {
            let path = path.as_ref().trim();
            if path.is_empty() {
                continue;
            }
            any = true;
            let segments: Vec<&str> = path.split('.').map(str::trim).collect();
            tree.add_segments(&segments);
        }
        if any { tree } else { Self::one_level() }
    }

    fn add_segments(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        if *first == "*" {
            if rest.is_empty() {
                // Deep wildcard subsumes any narrowing already recorded
                self.wildcard = Some(Wildcard::Deep);
            } else {
                match &mut self.wildcard {
                    Some(Wildcard::Deep) => {}
                    Some(Wildcard::Narrowed(sub)) => sub.add_segments(rest),
                    slot => {
                        let mut sub = Self::none();
                        sub.add_segments(rest);
                        *slot = Some(Wildcard::Narrowed(Box::new(sub)));
                    }
                }
            }
        } else {
            self.children
                .entry(SmolStr::new(first))
                .or_insert_with(Self::none)
                .add_segments(rest);
        }
    }

    /// Whether the named association is included at this level.
    pub fn includes(&self, name: &str) -> bool {
        self.wildcard.is_some() || self.children.contains_key(name)
    }

    /// The sub-tree to apply below the named association.
    ///
    /// A specific child wins over the wildcard; a deep wildcard yields the
    /// node itself; a name that is not included yields a node matching
    /// nothing, so recursion can still run link and exclusion logic against
    /// it without serializing anything.
    pub fn child<'a>(&'a self, name: &str) -> &'a IncludeTree {
        if let Some(child) = self.children.get(name) {
            return child;
        }
        match &self.wildcard {
            Some(Wildcard::Deep) => self,
            Some(Wildcard::Narrowed(sub)) => sub,
            None => &EMPTY,
        }
    }

    /// Whether this node matches no association at all.
    pub fn is_empty(&self) -> bool {
        self.wildcard.is_none() && self.children.is_empty()
    }

    /// Fold another tree into this one, keeping the union of both shapes.
    pub fn merge(&mut self, other: IncludeTree) {
        self.wildcard = match (self.wildcard.take(), other.wildcard) {
            (Some(Wildcard::Deep), _) | (_, Some(Wildcard::Deep)) => Some(Wildcard::Deep),
            (Some(Wildcard::Narrowed(mut a)), Some(Wildcard::Narrowed(b))) => {
                a.merge(*b);
                Some(Wildcard::Narrowed(a))
            }
            (one, None) => one,
            (None, other) => other,
        };
        for (name, child) in other.children {
            match self.children.entry(name) {
                indexmap::map::Entry::Occupied(mut existing) => existing.get_mut().merge(child),
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(child);
                }
            }
        }
    }

    /// A stable digest of this tree's shape.
    ///
    /// Two trees that include the same paths digest identically regardless
    /// of declaration order; trees of different depth or membership do not.
    /// Cache keys embed this so the same resource cached under different
    /// include shapes cannot collide.
    pub fn shape_digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_shape(&mut hasher);
        hasher.finish()
    }

    fn hash_shape<H: Hasher>(&self, state: &mut H) {
        match &self.wildcard {
            None => 0u8.hash(state),
            Some(Wildcard::Deep) => 1u8.hash(state),
            Some(Wildcard::Narrowed(sub)) => {
                2u8.hash(state);
                sub.hash_shape(state);
            }
        }
        let mut entries: Vec<(&SmolStr, &IncludeTree)> = self.children.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.len().hash(state);
        for (name, child) in entries {
            name.hash(state);
            child.hash_shape(state);
        }
    }
}

impl Default for IncludeTree {
    fn default() -> Self {
        Self::one_level()
    }
}

impl From<&str> for IncludeTree {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}
