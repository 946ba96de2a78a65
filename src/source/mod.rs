//! Content source contract consumed by the inlining pipeline.
//!
//! The pipeline never owns content entities: it reads them page by page
//! from a [`ContentSource`] and conditionally writes sparse patches back.
//! The host CMS implements this trait over its own persistence layer;
//! [`MemorySource`](memory::MemorySource) implements it in memory for tests.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemorySource;

/// One content entity as read from a collection.
///
/// Fields are an opaque JSON map; the pipeline only ever inspects the
/// fields named by a [`CollectionSpec`].
#[derive(Debug, Clone)]
pub struct SourceEntity {
    pub id: String,
    fields: Map<String, Value>,
}

impl SourceEntity {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a field as a string. Missing, null and non-string values all
    /// read as `None`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Overlay patch fields onto this entity.
    pub fn apply_patch(&mut self, fields: &Map<String, Value>) {
        for (name, value) in fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

/// A page of entities plus the token for the next page, if any.
#[derive(Debug, Clone)]
pub struct EntityPage {
    pub entities: Vec<SourceEntity>,
    pub next_page: Option<u32>,
}

/// Request for one page of a collection. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub limit: usize,
}

/// Options attached to a write-back.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Marks a system-originated write that bypasses user-facing
    /// permission and validation checks. The pipeline acts outside any
    /// user session, so every write it issues carries this marker.
    pub internal: bool,
}

impl WriteOptions {
    /// Options for a system-originated write.
    #[must_use]
    pub fn internal() -> Self {
        Self { internal: true }
    }
}

/// Sparse update for exactly one entity.
///
/// A rich-document patch carries the full re-serialized document; flat
/// patches carry only the touched field names.
#[derive(Debug, Clone)]
pub struct EntityPatch {
    pub entity_id: String,
    pub fields: Map<String, Value>,
}

/// Uniform paging/read and conditional-write contract over one entity
/// collection.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Name of the backing collection, used in operator-facing logs.
    fn collection(&self) -> &str;

    /// Read one page of entities. An error here is catastrophic for the
    /// run (the store is unreachable) and aborts it.
    async fn find_page(&self, request: PageRequest) -> Result<EntityPage>;

    /// Apply a sparse patch to exactly one entity.
    async fn edit(&self, patch: EntityPatch, options: WriteOptions) -> Result<()>;
}

/// Where media references live within an entity's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// A rich-document body requiring structural parsing of embedded
    /// elements.
    Document(String),
    /// A flat scalar field holding a single URL directly.
    Url(String),
}

/// Declares, per collection, which fields the extractor should inspect.
///
/// Bindings are data, not code: any collection can be bound to any mix of
/// document and flat URL fields.
#[derive(Debug, Clone, Default)]
pub struct CollectionSpec {
    fields: Vec<FieldTarget>,
}

impl CollectionSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect `field` as a rich-document body.
    #[must_use]
    pub fn document(mut self, field: impl Into<String>) -> Self {
        self.fields.push(FieldTarget::Document(field.into()));
        self
    }

    /// Inspect `field` as a flat URL field.
    #[must_use]
    pub fn url(mut self, field: impl Into<String>) -> Self {
        self.fields.push(FieldTarget::Url(field.into()));
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldTarget] {
        &self.fields
    }

    /// Fields inspected for the `posts` collection.
    #[must_use]
    pub fn posts() -> Self {
        Self::new().document("mobiledoc").url("feature_image")
    }

    /// Fields inspected for the `posts_meta` collection.
    #[must_use]
    pub fn posts_meta() -> Self {
        Self::new().url("og_image").url("twitter_image")
    }

    /// Fields inspected for the `tags` collection.
    #[must_use]
    pub fn tags() -> Self {
        Self::new()
            .url("feature_image")
            .url("og_image")
            .url("twitter_image")
    }

    /// Fields inspected for the `users` collection.
    #[must_use]
    pub fn users() -> Self {
        Self::new().url("profile_image").url("cover_image")
    }
}
