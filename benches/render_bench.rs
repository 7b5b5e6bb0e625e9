#![allow(dead_code, unused, clippy::type_complexity)]
//! Benchmarks for include parsing and document rendering.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use portray::prelude::*;
use portray::render::MemoryStore;
use portray::render::cache;
use portray::schema::CacheConfig;

struct User {
    id: i64,
    name: &'static str,
}

impl Resource for User {
    fn type_name(&self) -> &str {
        "User"
    }

    fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match name {
            "id" => Ok(Value::Int(self.id)),
            "name" => Ok(self.name.into()),
            _ => Err(ResourceError::unknown_attribute(name, "User")),
        }
    }

    fn related(&self, name: &str) -> ResourceResult<Related> {
        Err(ResourceError::unknown_association(name, "User"))
    }
}

struct Comment {
    id: i64,
    body: &'static str,
    author: Arc<User>,
}

impl Resource for Comment {
    fn type_name(&self) -> &str {
        "Comment"
    }

    fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match name {
            "id" => Ok(Value::Int(self.id)),
            "body" => Ok(self.body.into()),
            _ => Err(ResourceError::unknown_attribute(name, "Comment")),
        }
    }

    fn related(&self, name: &str) -> ResourceResult<Related> {
        match name {
            "author" => Ok(Related::One(self.author.clone() as ResourceRef)),
            _ => Err(ResourceError::unknown_association(name, "Comment")),
        }
    }
}

struct Post {
    id: i64,
    title: String,
    comments: Vec<ResourceRef>,
}

impl Resource for Post {
    fn type_name(&self) -> &str {
        "Post"
    }

    fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match name {
            "id" => Ok(Value::Int(self.id)),
            "title" => Ok(self.title.clone().into()),
            _ => Err(ResourceError::unknown_attribute(name, "Post")),
        }
    }

    fn related(&self, name: &str) -> ResourceResult<Related> {
        match name {
            "comments" => Ok(Related::Many(self.comments.clone())),
            _ => Err(ResourceError::unknown_association(name, "Post")),
        }
    }

    fn cache_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

fn post(id: i64, comments: usize) -> Arc<Post> {
    let author = Arc::new(User { id: 1, name: "ada" });
    Arc::new(Post {
        id,
        title: format!("Post number {id}"),
        comments: (0..comments)
            .map(|n| {
                Arc::new(Comment {
                    id: id * 100 + n as i64,
                    body: "a perfectly reasonable remark",
                    author: author.clone(),
                }) as ResourceRef
            })
            .collect(),
    })
}

fn registry(cacheable: bool) -> Arc<Registry> {
    let registry = Registry::new();
    let mut posts = Serializer::new("PostSerializer")
        .attrs(["id", "title"])
        .association(Association::many("comments"));
    if cacheable {
        posts = posts.cache(CacheConfig::new());
    }
    registry.register(posts);
    registry.register(
        Serializer::new("CommentSerializer")
            .attrs(["id", "body"])
            .association(Association::one("author")),
    );
    registry.register(Serializer::new("UserSerializer").attrs(["id", "name"]));
    Arc::new(registry)
}

/// Benchmark include-spec parsing and shape digests.
fn bench_include_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_parsing");

    group.bench_function("single_name", |b| {
        b.iter(|| black_box(IncludeTree::parse("comments")))
    });

    group.bench_function("dotted_path", |b| {
        b.iter(|| black_box(IncludeTree::parse("comments.author.profile")))
    });

    group.bench_function("many_paths", |b| {
        b.iter(|| {
            black_box(IncludeTree::parse(
                "author,comments.author,tags,likes.user.profile",
            ))
        })
    });

    group.bench_function("narrowed_wildcard", |b| {
        b.iter(|| black_box(IncludeTree::parse("*.comments")))
    });

    group.bench_function("shape_digest", |b| {
        let tree = IncludeTree::parse("author,comments.author,tags");
        b.iter(|| black_box(tree.shape_digest()))
    });

    group.finish();
}

/// Benchmark single-resource rendering.
fn bench_render_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_single");
    let subject = post(1, 5);

    group.bench_function("flat", |b| {
        let renderer = Renderer::with_registry(registry(false)).include(IncludeTree::none());
        b.iter(|| black_box(renderer.render_bare(subject.clone()).unwrap()))
    });

    group.bench_function("nested_include", |b| {
        let renderer = Renderer::with_registry(registry(false)).include("comments.author");
        b.iter(|| black_box(renderer.render(subject.clone()).unwrap()))
    });

    group.finish();
}

/// Benchmark collection rendering at increasing sizes.
fn bench_render_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_collection");

    for size in [10usize, 100] {
        let posts: Vec<Arc<Post>> = (0..size).map(|n| post(n as i64, 3)).collect();
        let renderer = Renderer::with_registry(registry(false)).include("comments");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &posts, |b, posts| {
            b.iter(|| black_box(renderer.render(posts.clone()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark fragment-cache hits against cold renders.
fn bench_fragment_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragment_cache");
    let registry = registry(true);
    let posts: Vec<Arc<Post>> = (0..50).map(|n| post(n, 0)).collect();
    let include = IncludeTree::none();

    group.bench_function("cold_store", |b| {
        let renderer = Renderer::with_registry(registry.clone())
            .store(Arc::new(MemoryStore::new()))
            .include(include.clone());
        b.iter(|| black_box(renderer.render(posts.clone()).unwrap()))
    });

    group.bench_function("warm_store", |b| {
        let store = Arc::new(MemoryStore::new());
        let serializer = registry.get("Post").unwrap();
        let shape = include.shape_digest();
        for subject in &posts {
            let key = cache::key_for(&serializer, subject.as_ref(), shape).unwrap();
            let mut fragment = ValueMap::new();
            fragment.insert("id".to_string(), Value::Int(subject.id));
            fragment.insert("title".to_string(), subject.title.clone().into());
            store.populate(key, Value::Map(fragment));
        }
        let renderer = Renderer::with_registry(registry.clone())
            .store(store)
            .include(include.clone());
        b.iter(|| black_box(renderer.render(posts.clone()).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_include_parsing,
    bench_render_single,
    bench_render_collection,
    bench_fragment_cache,
);

criterion_main!(benches);
