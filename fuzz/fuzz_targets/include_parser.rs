//! Fuzz target for the include-spec parser.
//!
//! This target feeds arbitrary strings to the include parser to find
//! crashes, panics, and other unexpected behavior.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use portray_render::IncludeTree;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string, ignoring invalid UTF-8
    if let Ok(input) = std::str::from_utf8(data) {
        // The parser has no error path; it must normalize anything
        let tree = IncludeTree::parse(input);

        // Traversal over whatever the parser built must not panic
        let _ = tree.includes("comments");
        let _ = tree.child("comments").child("author").is_empty();
        let _ = tree.shape_digest();

        // Parsing is deterministic
        assert_eq!(tree.shape_digest(), IncludeTree::parse(input).shape_digest());
    }
});
