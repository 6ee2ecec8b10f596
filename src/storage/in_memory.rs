//! In-memory implementation of DocumentStore for testing and development

use crate::core::DocumentStore;
use crate::core::query::{Document, Filter, ID_FIELD, Populate, Projection, matches};
use crate::core::service::UpdateOutcome;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Collection = IndexMap<String, Document>;

/// In-memory document store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Collections keep insertion order, so listings come back oldest first.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub fn len(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).map_or(0, IndexMap::len))
    }

    pub fn is_empty(&self, collection: &str) -> Result<bool> {
        Ok(self.len(collection)? == 0)
    }
}

/// Project `doc` and expand its populated reference, if any
fn shape(
    collections: &HashMap<String, Collection>,
    doc: &Document,
    projection: &Projection,
    populate: Option<&Populate>,
) -> Document {
    let mut shaped = projection.apply(doc.clone());

    if let Some(populate) = populate
        && let Some(reference) = populate.reference(&shaped)
    {
        let expanded = collections
            .get(&populate.from)
            .and_then(|target| target.get(reference))
            .map(|target| Value::Object(populate.select.apply(target.clone())))
            .unwrap_or(Value::Null);
        shaped.insert(populate.field.clone(), expanded);
    }

    shaped
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_all(
        &self,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .values()
            .filter(|doc| matches(filter, doc))
            .map(|doc| shape(&collections, doc, projection, populate))
            .collect())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| shape(&collections, doc, projection, populate)))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Document has no string '{}' field", ID_FIELD))?
            .to_string();

        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(anyhow!("Duplicate key '{}' in {}", id, collection));
        }

        docs.insert(id, document.clone());

        Ok(document)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(doc) = collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (key, value) in fields {
            if key == ID_FIELD {
                continue;
            }
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::new_id;
    use crate::core::repository::Repository;
    use crate::entities::order::{Order, ProductRef};
    use crate::entities::product::Product;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn seed_product(store: &InMemoryStore, id: &str, name: &str, price: f64) {
        store
            .insert(
                "products",
                doc(json!({ "_id": id, "name": name, "price": price, "productImage": "uploads/a.png" })),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;

        let found = store
            .find_by_id("products", "p1", &Projection::All, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], "Lamp");

        let missing = store
            .find_by_id("products", "nope", &Projection::All, None)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_requires_id() {
        let store = InMemoryStore::new();
        let err = store
            .insert("products", doc(json!({ "name": "Lamp" })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 1.0).await;
        let err = store
            .insert("products", doc(json!({ "_id": "p1" })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order_and_projects() {
        let store = InMemoryStore::new();
        seed_product(&store, "p2", "Desk", 80.0).await;
        seed_product(&store, "p1", "Lamp", 12.5).await;

        let docs = store
            .find_all(
                "products",
                &Filter::new(),
                &Projection::fields(&["name"]),
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            docs.into_iter().map(Value::Object).collect::<Vec<_>>(),
            vec![
                json!({ "_id": "p2", "name": "Desk" }),
                json!({ "_id": "p1", "name": "Lamp" }),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_all_on_unknown_collection_is_empty() {
        let store = InMemoryStore::new();
        let docs = store
            .find_all("orders", &Filter::new(), &Projection::All, None)
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_find_all_with_filter() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;
        seed_product(&store, "p2", "Desk", 80.0).await;

        let docs = store
            .find_all(
                "products",
                &doc(json!({ "name": "Desk" })),
                &Projection::All,
                None,
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["_id"], "p2");
    }

    #[tokio::test]
    async fn test_populate_expands_reference() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;
        store
            .insert("orders", doc(json!({ "_id": "o1", "product": "p1", "quantity": 2 })))
            .await
            .unwrap();

        let populate = Populate::new("product", "products", &["name", "price"]);
        let order = store
            .find_by_id("orders", "o1", &Projection::All, Some(&populate))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            order["product"],
            json!({ "_id": "p1", "name": "Lamp", "price": 12.5 })
        );
        assert_eq!(order["quantity"], 2);
    }

    #[tokio::test]
    async fn test_populate_dangling_reference_is_null() {
        let store = InMemoryStore::new();
        store
            .insert("orders", doc(json!({ "_id": "o1", "product": "gone", "quantity": 1 })))
            .await
            .unwrap();

        let populate = Populate::new("product", "products", &["name"]);
        let orders = store
            .find_all("orders", &Filter::new(), &Projection::All, Some(&populate))
            .await
            .unwrap();
        assert_eq!(orders[0]["product"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_fields_changes_only_named_fields() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;

        let outcome = store
            .update_fields("products", "p1", doc(json!({ "price": 42 })))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let found = store
            .find_by_id("products", "p1", &Projection::All, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["price"], 42);
        assert_eq!(found["name"], "Lamp");
        assert_eq!(found["productImage"], "uploads/a.png");
    }

    #[tokio::test]
    async fn test_update_fields_same_value_is_not_a_modification() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;

        let outcome = store
            .update_fields("products", "p1", doc(json!({ "name": "Lamp" })))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });
    }

    #[tokio::test]
    async fn test_update_fields_missing_document() {
        let store = InMemoryStore::new();
        let outcome = store
            .update_fields("products", "nope", doc(json!({ "price": 1 })))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_document_once() {
        let store = InMemoryStore::new();
        seed_product(&store, "p1", "Lamp", 12.5).await;
        seed_product(&store, "p2", "Desk", 80.0).await;

        let removed = store.delete_by_id("products", "p1").await.unwrap();
        assert_eq!(removed.unwrap()["name"], "Lamp");
        assert!(store.delete_by_id("products", "p1").await.unwrap().is_none());
        assert_eq!(store.len("products").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repository_round_trips_entities() {
        let store = Arc::new(InMemoryStore::new());
        let products = Repository::<Product>::new(store.clone());
        let orders = Repository::<Order>::new(store.clone());

        let product = products
            .insert(Product::new("Lamp", 12.5, "uploads/lamp.png"))
            .await
            .unwrap();
        let order = orders
            .insert(Order::new(&product.id, 3))
            .await
            .unwrap();

        let populate = Populate::new("product", "products", &["name", "price"]);
        let fetched = orders
            .find_by_id(&order.id, &Projection::All, Some(&populate))
            .await
            .unwrap()
            .unwrap();

        match fetched.product {
            ProductRef::Expanded(summary) => {
                assert_eq!(summary.id, product.id);
                assert_eq!(summary.name.as_deref(), Some("Lamp"));
                assert_eq!(summary.price, Some(12.5));
            }
            other => panic!("expected expanded product, got {:?}", other),
        }
        assert_eq!(fetched.quantity, 3);

        assert!(products.find_by_id(&new_id(), &Projection::All, None).await.unwrap().is_none());
        assert_eq!(products.find_all(&Projection::All, None).await.unwrap().len(), 1);
    }
}
