//! Fuzz target for untagged document-value decoding.
//!
//! This target feeds arbitrary JSON text to the `Value` deserializer and
//! checks that anything it accepts re-encodes to a stable fixpoint.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_value_json
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use portray_schema::Value;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string, ignoring invalid UTF-8
    if let Ok(input) = std::str::from_utf8(data) {
        // The deserializer should never panic, only return errors
        if let Ok(value) = serde_json::from_str::<Value>(input) {
            // Whatever it accepted must re-encode, and the re-encoding
            // must decode back to the same tree
            let encoded = serde_json::to_string(&value).expect("accepted value re-encodes");
            let decoded: Value = serde_json::from_str(&encoded).expect("re-encoding decodes");
            assert_eq!(decoded, value);
        }
    }
});
