//! Root-key derivation.

use convert_case::{Case, Casing};
use portray_schema::{Resource, Serializer};

/// Derive the document root key.
///
/// An explicit override on the serializer is used verbatim. Otherwise the
/// serializer's short name, or failing that the resource's declared type
/// name, is snake-cased and pluralized for collections. `default` applies
/// only when neither name is available (an empty collection, typically)
/// and is also used verbatim.
pub(crate) fn root_key(
    serializer: Option<&Serializer>,
    resource: Option<&dyn Resource>,
    default: Option<&str>,
    plural: bool,
) -> String {
    if let Some(key) = serializer.and_then(|s| s.root_key_override()) {
        return key.to_string();
    }

    let name = serializer
        .map(|s| s.short_name())
        .filter(|n| !n.is_empty())
        .or_else(|| resource.map(|r| r.type_name()))
        .filter(|n| !n.is_empty());

    match name {
        Some(name) => {
            let snake = name.to_case(Case::Snake);
            if plural { pluralize(&snake) } else { snake }
        }
        None => match default {
            Some(key) => key.to_string(),
            None => if plural { "objects" } else { "object" }.to_string(),
        },
    }
}

/// Conventional English pluralization for snake-cased model names.
fn pluralize(name: &str) -> String {
    let mut chars = name.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('y'), Some(prev)) if !"aeiou".contains(prev) => {
            format!("{}ies", &name[..name.len() - 1])
        }
        (Some('s' | 'x' | 'z'), _) => format!("{name}es"),
        (Some('h'), Some('c' | 's')) => format!("{name}es"),
        _ => format!("{name}s"),
    }
}
