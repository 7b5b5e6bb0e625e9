//! Structured fuzzing for the include-spec parser.
//!
//! This target generates semi-valid include specs using the `arbitrary`
//! crate to explore deeper tree shapes than raw bytes reach, and checks
//! that every generated path stays reachable in the parsed tree.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_structured
//! ```

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use portray_render::IncludeTree;

// Sanitized names never contain '-', so no generated path can shadow
// the probe with a specific child
const WILDCARD_PROBE: &str = "probe-name";

/// A generated path segment.
#[derive(Debug, Arbitrary)]
enum FuzzSegment {
    Wildcard,
    Name(String),
}

impl FuzzSegment {
    fn spell(&self) -> String {
        match self {
            Self::Wildcard => "*".to_string(),
            Self::Name(name) => sanitize_name(name),
        }
    }

    /// The name to walk the parsed tree with: wildcards match anything,
    /// so any un-shadowed probe will do.
    fn walk_name(&self) -> String {
        match self {
            Self::Wildcard => WILDCARD_PROBE.to_string(),
            Self::Name(name) => sanitize_name(name),
        }
    }
}

/// A generated dotted path.
#[derive(Debug, Arbitrary)]
struct FuzzPath {
    segments: Vec<FuzzSegment>,
}

impl FuzzPath {
    fn spell(&self) -> String {
        let segments: Vec<String> = self.segments.iter().map(FuzzSegment::spell).collect();
        segments.join(".")
    }
}

/// A generated include spec.
#[derive(Debug, Arbitrary)]
struct FuzzSpec {
    paths: Vec<FuzzPath>,
}

impl FuzzSpec {
    fn spell(&self) -> String {
        let paths: Vec<String> = self
            .paths
            .iter()
            .filter(|path| !path.segments.is_empty())
            .map(FuzzPath::spell)
            .collect();
        paths.join(",")
    }
}

/// Sanitize a string to be a plausible association name.
fn sanitize_name(s: &str) -> String {
    let name: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(20)
        .collect();
    if name.is_empty() { "assoc".to_string() } else { name }
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    if let Ok(spec) = FuzzSpec::arbitrary(&mut unstructured) {
        let spec_str = spec.spell();
        let tree = IncludeTree::parse(&spec_str);

        // Every generated path must stay reachable: at each level its
        // segment is either a specific child or covered by a wildcard
        for path in spec.paths.iter().filter(|path| !path.segments.is_empty()) {
            let mut cursor = &tree;
            for segment in &path.segments {
                let name = segment.walk_name();
                assert!(cursor.includes(&name), "path dropped from {spec_str:?}");
                cursor = cursor.child(&name);
            }
        }

        // Merging a tree into itself keeps its shape
        let digest = tree.shape_digest();
        let mut merged = tree.clone();
        merged.merge(tree);
        assert_eq!(merged.shape_digest(), digest);
    }
});
