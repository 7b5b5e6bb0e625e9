//! Side-loading: flattening embedded associations into sibling arrays.
//!
//! Moves association values out of the root body and appends them to flat
//! arrays keyed directly under the document root, so a client can
//! reconstruct the graph from sibling collections instead of walking a
//! nested tree. Values are never de-duplicated: when two parents carry the
//! same child, each parent's copy is appended as-is, and consumers relying
//! on per-parent copies see exactly what each parent held.

use indexmap::IndexMap;
use portray_schema::{Value, ValueMap};

/// Flatten the side-loaded `keys` of the body under `root_key` into
/// sibling arrays of `document`.
///
/// The transform is two-pass: extraction collects every removal and append
/// first, and the document is only touched afterwards. A `Null` or missing
/// body leaves the document unchanged.
pub(crate) fn flatten_into(document: &mut ValueMap, root_key: &str, keys: &[&str]) {
    if keys.is_empty() {
        return;
    }

    let mut extracted: IndexMap<String, Vec<Value>> = IndexMap::new();
    match document.get_mut(root_key) {
        None | Some(Value::Null) => return,
        Some(Value::Map(element)) => extract(element, keys, &mut extracted),
        Some(Value::Array(elements)) => {
            for element in elements {
                if let Value::Map(element) = element {
                    extract(element, keys, &mut extracted);
                }
            }
        }
        Some(_) => return,
    }

    for (key, values) in extracted {
        let bucket = document
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(bucket) = bucket.as_array_mut() {
            bucket.extend(values);
        }
    }
}

/// Pull the side-loaded keys out of one body element.
fn extract(element: &mut ValueMap, keys: &[&str], extracted: &mut IndexMap<String, Vec<Value>>) {
    for &key in keys {
        let Some(value) = element.shift_remove(key) else {
            continue;
        };
        match value {
            // A nil association is removed but contributes no sibling
            Value::Null => {}
            Value::Array(items) => extracted.entry(key.to_string()).or_default().extend(items),
            other => extracted.entry(key.to_string()).or_default().push(other),
        }
    }
}
