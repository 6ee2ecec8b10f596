//! Persistence capability consumed by the resource handlers

use crate::core::query::{Document, Filter, Populate, Projection};
use anyhow::Result;
use async_trait::async_trait;

/// Result of a partial update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents selected by the id
    pub matched: u64,
    /// Documents actually changed
    pub modified: u64,
}

/// Service trait for a document database
///
/// Documents live in named collections and are keyed by their `_id`
/// field. The handlers are agnostic to the underlying storage mechanism:
/// one adapter exists per store technology.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection` matching `filter`, in insertion order
    async fn find_all(
        &self,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Vec<Document>>;

    /// A single document by id
    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Option<Document>>;

    /// Insert a new document; it must already carry its `_id`
    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;

    /// Set the given fields on the document with this id
    ///
    /// Matching nothing is not an error.
    async fn update_fields(&self, collection: &str, id: &str, fields: Document)
    -> Result<UpdateOutcome>;

    /// Remove a document, returning it when one was removed
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;
}
