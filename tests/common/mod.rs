//! Shared helpers for the HTTP integration tests
//!
//! Each test gets its own server, store and upload directory. The upload
//! limit is kept small so oversize files are cheap to build.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use storefront::prelude::*;
use tempfile::TempDir;

pub const SECRET: &str = "integration-secret";
pub const PUBLIC_URL: &str = "http://localhost:3000";
pub const UPLOAD_LIMIT: usize = 1024;

/// A running test server with handles on its collaborators
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<CountingStore>,
    pub uploads: TempDir,
    pub token: String,
}

impl TestApp {
    /// Number of store calls made so far
    pub fn store_calls(&self) -> usize {
        self.store.calls()
    }

    /// Create a product through the API and return its id
    pub async fn create_product(&self, name: &str, price: &str) -> String {
        let response = self
            .server
            .post("/products")
            .authorization_bearer(&self.token)
            .multipart(product_form(name, price, png("lamp.png", 16)))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["createdProduct"]["_id"]
            .as_str()
            .expect("created product has an id")
            .to_string()
    }
}

pub fn config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.server.public_url = PUBLIC_URL.to_string();
    config.uploads.dir = uploads.path().to_path_buf();
    config.uploads.max_file_size = UPLOAD_LIMIT;
    config
}

/// A token signed with the server's secret
pub fn valid_token() -> String {
    JwtAuthProvider::new(SECRET, 3600)
        .issue_token("tester", Some("tester@example.com"))
        .expect("token signs")
}

/// Server backed by a fresh in-memory store
pub fn spawn_app() -> TestApp {
    let uploads = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(CountingStore::default());

    let app = ServerBuilder::new(config(&uploads))
        .with_shared_store(store.clone())
        .build()
        .expect("router builds");

    TestApp {
        server: TestServer::try_new(app).expect("Failed to create test server"),
        store,
        uploads,
        token: valid_token(),
    }
}

/// Server backed by a store that rejects every call
pub fn spawn_failing_app() -> (TestServer, TempDir) {
    let uploads = tempfile::tempdir().expect("temp dir");
    let app = ServerBuilder::new(config(&uploads))
        .with_store(FailingStore)
        .build()
        .expect("router builds");

    (TestServer::try_new(app).expect("Failed to create test server"), uploads)
}

pub fn png(file_name: &str, size: usize) -> Part {
    Part::bytes(vec![0x89; size])
        .file_name(file_name)
        .mime_type("image/png")
}

pub fn product_form(name: &str, price: &str, image: Part) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("price", price.to_string())
        .add_part("productImage", image)
}

// =============================================================================
// Stores
// =============================================================================

/// In-memory store that counts every call made to it
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn documents(&self, collection: &str) -> usize {
        self.inner.len(collection).expect("store readable")
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find_all(
        &self,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Vec<Document>> {
        self.record();
        self.inner
            .find_all(collection, filter, projection, populate)
            .await
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        projection: &Projection,
        populate: Option<&Populate>,
    ) -> Result<Option<Document>> {
        self.record();
        self.inner
            .find_by_id(collection, id, projection, populate)
            .await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        self.record();
        self.inner.insert(collection, document).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        self.record();
        self.inner.update_fields(collection, id, fields).await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.record();
        self.inner.delete_by_id(collection, id).await
    }
}

/// Store whose every call fails like an unreachable database
pub struct FailingStore;

pub const STORE_FAILURE: &str = "connection refused by document store";

#[async_trait]
impl DocumentStore for FailingStore {
    async fn find_all(
        &self,
        _: &str,
        _: &Filter,
        _: &Projection,
        _: Option<&Populate>,
    ) -> Result<Vec<Document>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn find_by_id(
        &self,
        _: &str,
        _: &str,
        _: &Projection,
        _: Option<&Populate>,
    ) -> Result<Option<Document>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn insert(&self, _: &str, _: Document) -> Result<Document> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn update_fields(&self, _: &str, _: &str, _: Document) -> Result<UpdateOutcome> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn delete_by_id(&self, _: &str, _: &str) -> Result<Option<Document>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }
}
