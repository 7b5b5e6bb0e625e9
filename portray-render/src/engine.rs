//! The attributes engine.
//!
//! A state-free recursive composer: one resource in, one ordered output map
//! out. Attributes come first, associations after, both in declaration
//! order of the serializer definition. Collections open a fragment wave
//! (one bulk cache read) before their members render; every recursion level
//! does the same for its own wave, so nested collections stay at one store
//! round-trip per wave.

use std::any::Any;
use std::sync::Arc;

use portray_schema::{
    Context, ReadPolicy, Registry, Resource, ResourceRef, Serializer, Value, ValueMap,
};

use crate::association;
use crate::cache::{CacheStore, FragmentWave};
use crate::error::RenderResult;
use crate::include::IncludeTree;

/// Everything one render pass shares across recursion levels.
#[derive(Clone, Copy)]
pub(crate) struct Pass<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) store: Option<&'a dyn CacheStore>,
    pub(crate) policy: Option<&'a dyn ReadPolicy>,
    pub(crate) scope: Option<&'a (dyn Any + Send + Sync)>,
    pub(crate) params: Option<&'a ValueMap>,
    pub(crate) namespace: Option<&'a str>,
}

/// Serialize one resource, with its own single-member fragment wave.
pub(crate) fn render_single(
    pass: &Pass<'_>,
    serializer: &Serializer,
    resource: &dyn Resource,
    include: &IncludeTree,
) -> RenderResult<ValueMap> {
    let wave = FragmentWave::collect(pass.store, [(serializer, resource)], include.shape_digest());
    compose(pass, serializer, resource, include, wave.fragment(0))
}

/// Serialize a collection: one fragment wave for all members, then each
/// member independently, order preserved.
pub(crate) fn render_collection(
    pass: &Pass<'_>,
    members: &[(Arc<Serializer>, ResourceRef)],
    include: &IncludeTree,
) -> RenderResult<Vec<Value>> {
    let wave = FragmentWave::collect(
        pass.store,
        members.iter().map(|(s, r)| (s.as_ref(), r.as_ref())),
        include.shape_digest(),
    );
    members
        .iter()
        .enumerate()
        .map(|(index, (serializer, resource))| {
            compose(pass, serializer, resource.as_ref(), include, wave.fragment(index))
                .map(Value::Map)
        })
        .collect()
}

/// Compose one resource's output map.
///
/// Fragment entries serve only attributes the serializer's cache config
/// covers; those slots skip the value rule entirely. Everything else is
/// computed fresh, so fresh values win wherever both sources could apply.
fn compose(
    pass: &Pass<'_>,
    serializer: &Serializer,
    resource: &dyn Resource,
    include: &IncludeTree,
    fragment: Option<&ValueMap>,
) -> RenderResult<ValueMap> {
    let permitted = pass.policy.and_then(|p| p.permitted_attributes(pass.namespace));

    let mut ctx = Context::new(resource);
    if let Some(scope) = pass.scope {
        ctx = ctx.with_scope(scope);
    }
    if let Some(params) = pass.params {
        ctx = ctx.with_params(params);
    }
    if let Some(fragment) = fragment {
        ctx = ctx.with_fragment(fragment);
    }

    let mut out = ValueMap::new();
    for field in serializer.attributes() {
        if field.excluded(&ctx, permitted.as_ref()) {
            continue;
        }
        let key = field.output_key();
        let value = match fragment.and_then(|f| f.get(key)) {
            Some(hit) if serializer.cacheable_attribute(field.name()) => hit.clone(),
            _ => field.value_for(&ctx)?,
        };
        out.insert(key.to_string(), value);
    }

    for assoc in serializer.associations() {
        if assoc.excluded(&ctx, permitted.as_ref()) {
            continue;
        }
        let resolved = association::resolve_association(
            pass,
            assoc,
            &ctx,
            include.child(assoc.name()),
            include.includes(assoc.name()),
        )?;
        if let Some(entry) = resolved.into_entry() {
            out.insert(assoc.output_key().to_string(), entry);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use portray_schema::{
        Association, CacheConfig, Field, Registry, Related, Resource, ResourceError,
        ResourceResult, Serializer, Value, ValueMap,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cache::{self, MemoryStore};

    struct Record {
        type_name: &'static str,
        id: Option<&'static str>,
        fields: ValueMap,
        children: HashMap<&'static str, Related>,
        plain: Option<Value>,
    }

    impl Record {
        fn new(type_name: &'static str, fields: &[(&str, Value)]) -> Self {
            Self {
                type_name,
                id: None,
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                children: HashMap::new(),
                plain: None,
            }
        }

        fn with_id(mut self, id: &'static str) -> Self {
            self.id = Some(id);
            self
        }

        fn with_child(mut self, name: &'static str, related: Related) -> Self {
            self.children.insert(name, related);
            self
        }

        fn with_plain(mut self, value: Value) -> Self {
            self.plain = Some(value);
            self
        }
    }

    impl Resource for Record {
        fn type_name(&self) -> &str {
            self.type_name
        }

        fn attribute(&self, name: &str) -> ResourceResult<Value> {
            self.fields
                .get(name)
                .cloned()
                .ok_or_else(|| ResourceError::unknown_attribute(name, self.type_name))
        }

        fn related(&self, name: &str) -> ResourceResult<Related> {
            self.children
                .get(name)
                .cloned()
                .ok_or_else(|| ResourceError::unknown_association(name, self.type_name))
        }

        fn cache_id(&self) -> Option<String> {
            self.id.map(str::to_string)
        }

        fn as_value(&self) -> Option<Value> {
            self.plain.clone()
        }
    }

    fn pass(registry: &Registry) -> Pass<'_> {
        Pass {
            registry,
            store: None,
            policy: None,
            scope: None,
            params: None,
            namespace: None,
        }
    }

    fn keys(map: &ValueMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    // ==================== Ordering ====================

    #[test]
    fn test_output_keys_follow_declaration_order() {
        let registry = Registry::new();
        let serializer = Serializer::new("Post").attrs(["title", "id", "body"]);
        let post = Record::new(
            "Post",
            &[
                ("id", Value::Int(1)),
                ("title", "hello".into()),
                ("body", "world".into()),
            ],
        );

        let out = render_single(&pass(&registry), &serializer, &post, &IncludeTree::none())
            .unwrap();
        assert_eq!(keys(&out), vec!["title", "id", "body"]);
    }

    #[test]
    fn test_associations_follow_attributes() {
        let registry = Registry::new();
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::one("author"))
            .association(Association::many("comments"));
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("author", Related::None)
            .with_child("comments", Related::Many(vec![]));

        let out = render_single(
            &pass(&registry),
            &serializer,
            &post,
            &IncludeTree::one_level(),
        )
        .unwrap();
        assert_eq!(keys(&out), vec!["id", "author", "comments"]);
    }

    // ==================== Include gating ====================

    #[test]
    fn test_association_outside_include_tree_is_omitted() {
        let registry = Registry::new();
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::many("comments"));
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("comments", Related::Many(vec![]));

        let out = render_single(&pass(&registry), &serializer, &post, &IncludeTree::none())
            .unwrap();
        assert_eq!(keys(&out), vec!["id"]);
    }

    #[test]
    fn test_nil_to_one_serializes_as_explicit_null() {
        let registry = Registry::new();
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::one("author"));
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("author", Related::None);

        let out = render_single(
            &pass(&registry),
            &serializer,
            &post,
            &IncludeTree::one_level(),
        )
        .unwrap();
        assert_eq!(out["author"], Value::Null);
    }

    #[test]
    fn test_nested_include_recurses_one_level_at_a_time() {
        let registry = Registry::new();
        registry.register(
            Serializer::new("Comment")
                .attr("body")
                .association(Association::one("author")),
        );
        registry.register(Serializer::new("User").attr("name"));

        let author: ResourceRef =
            Arc::new(Record::new("User", &[("name", "ada".into())]));
        let comment: ResourceRef = Arc::new(
            Record::new("Comment", &[("body", "nice".into())])
                .with_child("author", Related::One(author)),
        );
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("comments", Related::Many(vec![comment]));
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::many("comments"));

        let include = IncludeTree::parse("comments.author");
        let out = render_single(&pass(&registry), &serializer, &post, &include).unwrap();

        let comments = out["comments"].as_array().unwrap();
        let first = comments[0].as_map().unwrap();
        assert_eq!(first["body"], "nice".into());
        let author = first["author"].as_map().unwrap();
        assert_eq!(author["name"], "ada".into());
    }

    #[test]
    fn test_missing_member_serializer_degrades_to_virtual_values() {
        let registry = Registry::new();
        let tag: ResourceRef = Arc::new(
            Record::new("Tag", &[]).with_plain("rust".into()),
        );
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("tags", Related::Many(vec![tag]));
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::many("tags"));

        let out = render_single(
            &pass(&registry),
            &serializer,
            &post,
            &IncludeTree::one_level(),
        )
        .unwrap();
        assert_eq!(out["tags"], Value::Array(vec!["rust".into()]));
    }

    #[test]
    fn test_opaque_single_target_without_serializer_omits_the_key() {
        let registry = Registry::new();
        let owner: ResourceRef = Arc::new(Record::new("Owner", &[]));
        let post = Record::new("Post", &[("id", Value::Int(1))])
            .with_child("owner", Related::One(owner));
        let serializer = Serializer::new("Post")
            .attr("id")
            .association(Association::one("owner"));

        let out = render_single(
            &pass(&registry),
            &serializer,
            &post,
            &IncludeTree::one_level(),
        )
        .unwrap();
        assert_eq!(keys(&out), vec!["id"]);
    }

    // ==================== Policy ====================

    #[test]
    fn test_policy_denied_attributes_are_absent() {
        use portray_schema::AllowList;

        let registry = Registry::new();
        let policy = AllowList::new(["id"]);
        let serializer = Serializer::new("Post").attrs(["id", "title"]);
        let post = Record::new(
            "Post",
            &[("id", Value::Int(1)), ("title", "secret".into())],
        );

        let mut p = pass(&registry);
        p.policy = Some(&policy);
        let out = render_single(&p, &serializer, &post, &IncludeTree::none()).unwrap();
        assert_eq!(keys(&out), vec!["id"]);
    }

    // ==================== Fragment caching ====================

    #[test]
    fn test_fragment_serves_cacheable_attributes_without_recompute() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = calls.clone();
        let serializer = Serializer::new("Post")
            .attribute(Field::new("title").value(move |_| {
                probe.fetch_add(1, Ordering::SeqCst);
                Ok("computed".into())
            }))
            .attr("id")
            .cache(CacheConfig::new().only(["title"]));
        let post = Record::new("Post", &[("id", Value::Int(7))]).with_id("7");

        let include = IncludeTree::none();
        let store = MemoryStore::new();
        let key = cache::key_for(&serializer, &post, include.shape_digest()).unwrap();
        let mut fragment = ValueMap::new();
        fragment.insert("title".to_string(), "cached".into());
        store.populate(key, Value::Map(fragment));

        let mut p = pass(&registry);
        p.store = Some(&store);
        let out = render_single(&p, &serializer, &post, &include).unwrap();

        assert_eq!(out["title"], "cached".into());
        assert_eq!(out["id"], Value::Int(7));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.read_count(), 1);
    }

    #[test]
    fn test_fragment_never_serves_uncovered_attributes() {
        let registry = Registry::new();
        let serializer = Serializer::new("Post")
            .attrs(["id", "title"])
            .cache(CacheConfig::new().only(["id"]));
        let post = Record::new(
            "Post",
            &[("id", Value::Int(7)), ("title", "fresh".into())],
        )
        .with_id("7");

        let include = IncludeTree::none();
        let store = MemoryStore::new();
        let key = cache::key_for(&serializer, &post, include.shape_digest()).unwrap();
        let mut fragment = ValueMap::new();
        fragment.insert("id".to_string(), Value::Int(7));
        fragment.insert("title".to_string(), "stale".into());
        store.populate(key, Value::Map(fragment));

        let mut p = pass(&registry);
        p.store = Some(&store);
        let out = render_single(&p, &serializer, &post, &include).unwrap();

        // Fresh computation wins for attributes outside the cacheable set
        assert_eq!(out["title"], "fresh".into());
    }

    #[test]
    fn test_collection_issues_one_bulk_read() {
        let registry = Registry::new();
        let serializer = Arc::new(Serializer::new("Post").attr("id").cache(CacheConfig::new()));
        let members: Vec<(Arc<Serializer>, ResourceRef)> = (1..=3)
            .map(|n| {
                let post = Record::new("Post", &[("id", Value::Int(n))])
                    .with_id(["1", "2", "3"][n as usize - 1]);
                (serializer.clone(), Arc::new(post) as ResourceRef)
            })
            .collect();

        let store = MemoryStore::new();
        let mut p = pass(&registry);
        p.store = Some(&store);
        let out = render_collection(&p, &members, &IncludeTree::none()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(store.read_count(), 1);
    }
}
