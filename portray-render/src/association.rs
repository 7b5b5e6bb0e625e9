//! Association resolution.
//!
//! Turns an [`Association`] descriptor plus one parent resource into the
//! value stored under the association's output key: the serialized child
//! tree, a virtual value when no serializer can be found, an explicit
//! `Null` for an absent to-one target, or links/meta alone when data is
//! switched off or not included.
//!
//! Serializer-lookup misses on associations are never fatal. A collection
//! with any undiscoverable member degrades to a virtual value built from
//! each member's plain-data coercion; an opaque member coerces to `Null`.
//! A lone undiscoverable target with no coercion yields no data instead,
//! so the key is omitted unless links or meta are configured.

use portray_schema::{Association, Context, Related, Resource, Value, ValueMap};
use tracing::debug;

use crate::engine::{self, Pass};
use crate::error::RenderResult;
use crate::include::IncludeTree;

/// The data arm of a resolved association.
pub(crate) enum AssociationData {
    /// A value to store under the key: a child tree, a virtual value, or
    /// an explicit `Null` for an empty to-one target.
    Present(Value),
    /// No data: the association was not included, or data was switched
    /// off by the descriptor.
    Absent,
}

/// One association resolved against one parent resource.
pub(crate) struct ResolvedAssociation {
    pub(crate) data: AssociationData,
    pub(crate) links: ValueMap,
    pub(crate) meta: Option<Value>,
}

impl ResolvedAssociation {
    /// Compose the output entry for this association.
    ///
    /// Bare data when only data is present; a `{data, links, meta}` map
    /// when links or meta accompany it; `{links, meta}` without data; and
    /// `None` (key omitted) when there is nothing at all.
    pub(crate) fn into_entry(self) -> Option<Value> {
        let Self { data, links, meta } = self;
        let has_extras = !links.is_empty() || meta.is_some();

        let wrap = |data: Option<Value>| {
            let mut map = ValueMap::new();
            if let Some(value) = data {
                map.insert("data".to_string(), value);
            }
            if !links.is_empty() {
                map.insert("links".to_string(), Value::Map(links.clone()));
            }
            if let Some(meta) = meta.clone() {
                map.insert("meta".to_string(), meta);
            }
            Value::Map(map)
        };

        match data {
            AssociationData::Present(value) if !has_extras => Some(value),
            AssociationData::Present(value) => Some(wrap(Some(value))),
            AssociationData::Absent if has_extras => Some(wrap(None)),
            AssociationData::Absent => None,
        }
    }
}

/// Resolve one association for one parent resource.
///
/// Links and meta are evaluated against the parent's context whether or
/// not the association is included; only included associations with data
/// enabled resolve their target and recurse into child serialization.
pub(crate) fn resolve_association(
    pass: &Pass<'_>,
    association: &Association,
    ctx: &Context<'_>,
    child_include: &IncludeTree,
    included: bool,
) -> RenderResult<ResolvedAssociation> {
    let mut links = ValueMap::new();
    for (name, entry) in association.links() {
        links.insert(name.to_string(), entry.resolve(ctx)?);
    }
    let meta = match association.meta_entry() {
        Some(entry) => Some(entry.resolve(ctx)?),
        None => None,
    };

    if !included || !association.includes_data() {
        return Ok(ResolvedAssociation {
            data: AssociationData::Absent,
            links,
            meta,
        });
    }

    let related = association.related_for(ctx)?;
    let data = serialize_related(pass, association, related, child_include)?;
    Ok(ResolvedAssociation { data, links, meta })
}

fn serialize_related(
    pass: &Pass<'_>,
    association: &Association,
    related: Related,
    include: &IncludeTree,
) -> RenderResult<AssociationData> {
    match related {
        // An empty to-one target stores an explicit null, not an omitted key
        Related::None => Ok(AssociationData::Present(Value::Null)),
        Related::Raw(value) => Ok(AssociationData::Present(value)),
        Related::One(resource) => {
            let found =
                pass.registry
                    .lookup(resource.as_ref(), association.serializer_name(), pass.namespace);
            match found {
                Some(serializer) => {
                    let map = engine::render_single(pass, &serializer, resource.as_ref(), include)?;
                    Ok(AssociationData::Present(Value::Map(map)))
                }
                None => match resource.as_value() {
                    Some(value) => {
                        debug!(
                            association = association.name(),
                            target = resource.type_name(),
                            "no serializer for association target, using virtual value"
                        );
                        Ok(AssociationData::Present(value))
                    }
                    // Opaque target with nothing to coerce: no data at all,
                    // unlike an absent target which stores an explicit null
                    None => {
                        debug!(
                            association = association.name(),
                            target = resource.type_name(),
                            "no serializer for opaque association target, omitting data"
                        );
                        Ok(AssociationData::Absent)
                    }
                },
            }
        }
        Related::Many(resources) => {
            let mut members = Vec::with_capacity(resources.len());
            for resource in &resources {
                let found = pass.registry.lookup(
                    resource.as_ref(),
                    association.serializer_name(),
                    pass.namespace,
                );
                match found {
                    Some(serializer) => members.push((serializer, resource.clone())),
                    None => {
                        // One undiscoverable member degrades the whole
                        // collection to its plain-data coercions
                        debug!(
                            association = association.name(),
                            target = resource.type_name(),
                            "no serializer for collection member, using virtual values"
                        );
                        return Ok(AssociationData::Present(Value::Array(
                            resources.iter().map(|r| virtual_value(r.as_ref())).collect(),
                        )));
                    }
                }
            }
            let values = engine::render_collection(pass, &members, include)?;
            Ok(AssociationData::Present(Value::Array(values)))
        }
    }
}

/// A resource's plain-data rendition, `Null` when it has none.
fn virtual_value(resource: &dyn Resource) -> Value {
    resource.as_value().unwrap_or(Value::Null)
}
