//! Typed access to a [`DocumentStore`] collection
//!
//! Entities are serialized via `serde_json::Value` as an intermediate
//! format: the store only ever sees documents, handlers only ever see
//! entity structs.

use crate::core::entity::Entity;
use crate::core::query::{Document, Filter, Populate, Projection};
use crate::core::service::{DocumentStore, UpdateOutcome};
use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::sync::Arc;

/// Collection of `T` entities backed by a document store
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    fn collection() -> &'static str {
        T::resource_name()
    }

    /// Convert a domain entity into a document
    fn entity_to_document(entity: &T) -> Result<Document> {
        match serde_json::to_value(entity)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", T::resource_name_singular(), e))?
        {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(anyhow!(
                "{} did not serialize to an object",
                T::resource_name_singular()
            )),
        }
    }

    /// Convert a document back into a domain entity
    fn document_to_entity(doc: Document) -> Result<T> {
        serde_json::from_value(serde_json::Value::Object(doc)).map_err(|e| {
            anyhow!(
                "Failed to deserialize {} from document: {}",
                T::resource_name_singular(),
                e
            )
        })
    }

    pub async fn find_all(
        &self,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Vec<T>> {
        let docs = self
            .store
            .find_all(Self::collection(), &Filter::new(), projection, populate)
            .await?;

        docs.into_iter().map(Self::document_to_entity).collect()
    }

    pub async fn find_by_id(
        &self,
        id: &str,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Option<T>> {
        self.store
            .find_by_id(Self::collection(), id, projection, populate)
            .await?
            .map(Self::document_to_entity)
            .transpose()
    }

    pub async fn insert(&self, entity: T) -> Result<T> {
        let doc = Self::entity_to_document(&entity)?;
        let stored = self.store.insert(Self::collection(), doc).await?;
        Self::document_to_entity(stored)
    }

    pub async fn update_fields(&self, id: &str, fields: Document) -> Result<UpdateOutcome> {
        self.store
            .update_fields(Self::collection(), id, fields)
            .await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<Option<T>> {
        self.store
            .delete_by_id(Self::collection(), id)
            .await?
            .map(Self::document_to_entity)
            .transpose()
    }
}
