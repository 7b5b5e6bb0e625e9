//! Integration tests for side-loaded documents.
//!
//! Associations marked `embed_in_root` leave the body and land in sibling
//! arrays directly under the document root, one copy per parent, never
//! de-duplicated.

use std::sync::Arc;

use portray::prelude::*;
use pretty_assertions::assert_eq;

// ==================== Fixtures ====================

struct Comment {
    id: i64,
    body: &'static str,
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
        Err(ResourceError::unknown_association(name, "Comment"))
    }
}

struct Post {
    id: i64,
    title: &'static str,
    author: Option<ResourceRef>,
    comments: Vec<ResourceRef>,
}

impl Resource for Post {
    fn type_name(&self) -> &str {
        "Post"
    }

    fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match name {
            "id" => Ok(Value::Int(self.id)),
            "title" => Ok(self.title.into()),
            _ => Err(ResourceError::unknown_attribute(name, "Post")),
        }
    }

    fn related(&self, name: &str) -> ResourceResult<Related> {
        match name {
            "author" => Ok(self.author.clone().into()),
            "comments" => Ok(Related::Many(self.comments.clone())),
            _ => Err(ResourceError::unknown_association(name, "Post")),
        }
    }
}

struct Author {
    id: i64,
    name: &'static str,
}

impl Resource for Author {
    fn type_name(&self) -> &str {
        "Author"
    }

    fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match name {
            "id" => Ok(Value::Int(self.id)),
            "name" => Ok(self.name.into()),
            _ => Err(ResourceError::unknown_attribute(name, "Author")),
        }
    }

    fn related(&self, name: &str) -> ResourceResult<Related> {
        Err(ResourceError::unknown_association(name, "Author"))
    }
}

fn comment(id: i64, body: &'static str) -> ResourceRef {
    Arc::new(Comment { id, body })
}

fn post(id: i64, title: &'static str, comments: Vec<ResourceRef>) -> Arc<Post> {
    Arc::new(Post { id, title, author: None, comments })
}

fn sideload_registry() -> Arc<Registry> {
    let registry = Registry::new();
    registry.register(
        Serializer::new("PostSerializer")
            .attrs(["id", "title"])
            .association(Association::one("author").embed_in_root())
            .association(Association::many("comments").embed_in_root()),
    );
    registry.register(Serializer::new("CommentSerializer").attrs(["id", "body"]));
    registry.register(Serializer::new("AuthorSerializer").attrs(["id", "name"]));
    Arc::new(registry)
}

// ==================== Single resource ====================

/// One post with two comments: the comments key leaves the body and the
/// serialized mappings land in a sibling array.
#[test]
fn test_single_post_sideloads_comments() {
    let subject = post(1, "Borrow Checker Diaries", vec![
        comment(10, "clear"),
        comment(11, "useful"),
    ]);
    let doc = Renderer::with_registry(sideload_registry())
        .include("comments")
        .render(subject)
        .expect("render");

    assert_eq!(
        doc.to_json().unwrap(),
        concat!(
            r#"{"post":{"id":1,"title":"Borrow Checker Diaries"},"#,
            r#""comments":[{"id":10,"body":"clear"},{"id":11,"body":"useful"}]}"#
        )
    );
}

/// A side-loaded to-one association appends its single mapping to the
/// sibling array.
#[test]
fn test_sideloaded_to_one_appends_single_mapping() {
    let subject = Arc::new(Post {
        id: 1,
        title: "Signed",
        author: Some(Arc::new(Author { id: 7, name: "ada" }) as ResourceRef),
        comments: vec![],
    });
    let doc = Renderer::with_registry(sideload_registry())
        .include("author")
        .render(subject)
        .expect("render");

    assert!(!doc.body["post"].as_map().unwrap().contains_key("author"));
    let authors = doc.body["author"].as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].as_map().unwrap()["name"], "ada".into());
}

/// An included empty collection still claims its sibling array.
#[test]
fn test_empty_sideloaded_collection_creates_empty_sibling() {
    let doc = Renderer::with_registry(sideload_registry())
        .include("comments")
        .render(post(1, "Quiet", vec![]))
        .expect("render");

    assert_eq!(doc.body["comments"], Value::Array(vec![]));
}

/// An association that was not included cannot be flattened; no key in
/// the body, no sibling array.
#[test]
fn test_not_included_association_is_skipped() {
    let doc = Renderer::with_registry(sideload_registry())
        .include(IncludeTree::none())
        .render(post(1, "Bare", vec![comment(10, "unseen")]))
        .expect("render");

    assert!(!doc.body["post"].as_map().unwrap().contains_key("comments"));
    assert!(!doc.body.contains_key("comments"));
}

// ==================== Collections ====================

/// Two posts each contribute their own comment copies; nothing is
/// de-duplicated even when the serialized mappings are identical.
#[test]
fn test_collection_sideload_never_dedups() {
    let shared = comment(7, "same words");
    let doc = Renderer::with_registry(sideload_registry())
        .include("comments")
        .render(vec![
            post(1, "First", vec![shared.clone()]),
            post(2, "Second", vec![shared]),
        ])
        .expect("render");

    let posts = doc.body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert!(!posts[0].as_map().unwrap().contains_key("comments"));

    let comments = doc.body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0], comments[1]);
}

/// Inline and side-loaded associations coexist: only the flagged one
/// leaves the body.
#[test]
fn test_mixed_inline_and_embedded_associations() {
    let registry = Registry::new();
    registry.register(
        Serializer::new("PostSerializer")
            .attrs(["id", "title"])
            .association(Association::one("author"))
            .association(Association::many("comments").embed_in_root()),
    );
    registry.register(Serializer::new("CommentSerializer").attrs(["id", "body"]));
    registry.register(Serializer::new("AuthorSerializer").attrs(["id", "name"]));

    let subject = Arc::new(Post {
        id: 1,
        title: "Mixed",
        author: Some(Arc::new(Author { id: 7, name: "ada" }) as ResourceRef),
        comments: vec![comment(10, "inline no more")],
    });
    let doc = Renderer::with_registry(Arc::new(registry))
        .include("author,comments")
        .render(subject)
        .expect("render");

    let body = doc.body["post"].as_map().unwrap();
    assert!(body.contains_key("author"));
    assert!(!body.contains_key("comments"));
    assert_eq!(doc.body["comments"].as_array().unwrap().len(), 1);
}
