//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides a `MongoStore` implementation of [`DocumentStore`] backed by
//! a `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! storefront = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Each resource lives in its own collection (`products`, `orders`).
//! Ids are stored as plain strings in `_id`, so lookups never need to
//! parse an `ObjectId` and a malformed id simply matches nothing.
//!
//! # Serialization strategy
//!
//! Documents travel as `serde_json` objects and are converted to BSON at
//! the edge. Reads are converted back with relaxed extended JSON so
//! numbers come back as plain JSON numbers.

use crate::core::DocumentStore;
use crate::core::query::{self, Filter, ID_FIELD, Populate, Projection};
use crate::core::service::UpdateOutcome;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection, Database};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON object into a BSON Document.
fn json_to_document(json: query::Document) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    match bson_val {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

/// Convert a BSON Document back into a JSON object.
fn document_to_json(doc: Document) -> query::Document {
    match Bson::Document(doc).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        _ => query::Document::new(),
    }
}

/// MongoDB projection document for a [`Projection`]
///
/// `_id` is returned by MongoDB unless excluded, which matches the
/// projection contract.
fn projection_document(projection: &Projection) -> Option<Document> {
    match projection {
        Projection::All => None,
        Projection::Fields(fields) => Some(
            fields
                .iter()
                .map(|f| (f.clone(), Bson::Int32(1)))
                .collect(),
        ),
    }
}

// ---------------------------------------------------------------------------
// MongoStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use storefront::storage::MongoStore;
///
/// let store = MongoStore::connect("mongodb://localhost:27017", "storefront").await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Create a new `MongoStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect to `uri` and use `database`
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;

        Ok(Self::new(client.database(database)))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    /// Replace each document's reference field with its expansion
    ///
    /// The referenced documents are fetched in a single `$in` query.
    async fn populate(&self, docs: &mut [query::Document], populate: &Populate) -> Result<()> {
        let ids: Vec<Bson> = docs
            .iter()
            .filter_map(|doc| populate.reference(doc))
            .map(|id| Bson::String(id.to_string()))
            .collect();

        if ids.is_empty() {
            return Ok(());
        }

        let coll = self.collection(&populate.from);
        let mut find = coll
            .find(doc! { ID_FIELD: { "$in": ids } });
        if let Some(projection) = projection_document(&populate.select) {
            find = find.projection(projection);
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to populate '{}': {}", populate.field, e))?;

        let targets: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect '{}': {}", populate.from, e))?;

        let by_id: HashMap<String, query::Document> = targets
            .into_iter()
            .map(document_to_json)
            .filter_map(|target| {
                let id = target.get(ID_FIELD)?.as_str()?.to_string();
                Some((id, target))
            })
            .collect();

        for doc in docs.iter_mut() {
            let Some(reference) = populate.reference(doc) else {
                continue;
            };
            let expanded = by_id
                .get(reference)
                .cloned()
                .map(serde_json::Value::Object)
                .unwrap_or(serde_json::Value::Null);
            doc.insert(populate.field.clone(), expanded);
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_all(
        &self,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Vec<query::Document>> {
        let coll = self.collection(collection);
        let mut find = coll
            .find(json_to_document(filter.clone())?);
        if let Some(projection) = projection_document(projection) {
            find = find.projection(projection);
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to list {}: {}", collection, e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect {}: {}", collection, e))?;

        let mut docs: Vec<query::Document> = docs.into_iter().map(document_to_json).collect();
        if let Some(populate) = populate {
            self.populate(&mut docs, populate).await?;
        }

        Ok(docs)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Option<query::Document>> {
        let coll = self.collection(collection);
        let mut find = coll.find_one(doc! { ID_FIELD: id });
        if let Some(projection) = projection_document(projection) {
            find = find.projection(projection);
        }

        let found = find
            .await
            .map_err(|e| anyhow!("Failed to get {} '{}': {}", collection, id, e))?;

        let Some(found) = found else {
            return Ok(None);
        };

        let mut docs = [document_to_json(found)];
        if let Some(populate) = populate {
            self.populate(&mut docs, populate).await?;
        }

        let [doc] = docs;
        Ok(Some(doc))
    }

    async fn insert(&self, collection: &str, document: query::Document) -> Result<query::Document> {
        if !document.get(ID_FIELD).is_some_and(serde_json::Value::is_string) {
            return Err(anyhow!("Document has no string '{}' field", ID_FIELD));
        }

        self.collection(collection)
            .insert_one(json_to_document(document.clone())?)
            .await
            .map_err(|e| anyhow!("Failed to insert into {}: {}", collection, e))?;

        Ok(document)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: query::Document,
    ) -> Result<UpdateOutcome> {
        fields.remove(ID_FIELD);
        if fields.is_empty() {
            return Ok(UpdateOutcome::default());
        }

        let result = self
            .collection(collection)
            .update_one(doc! { ID_FIELD: id }, doc! { "$set": json_to_document(fields)? })
            .await
            .map_err(|e| anyhow!("Failed to update {} '{}': {}", collection, id, e))?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<query::Document>> {
        let removed = self
            .collection(collection)
            .find_one_and_delete(doc! { ID_FIELD: id })
            .await
            .map_err(|e| anyhow!("Failed to delete {} '{}': {}", collection, id, e))?;

        Ok(removed.map(document_to_json))
    }
}
