//! # Storefront
//!
//! A products and orders REST API over a pluggable document store.
//!
//! ## Features
//!
//! - **Products**: list, create with an uploaded image, fetch, partial update, delete
//! - **Orders**: list and fetch with the product expanded, create against an existing product, cancel
//! - **Bearer tokens**: HS256 JWTs guard the product write and read-by-id routes
//! - **Hyperlinked responses**: every payload carries a `request` hint for a related call
//! - **Pluggable storage**: in-memory by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let config = AppConfig::load()?;
//! ServerBuilder::new(config)
//!     .with_store(InMemoryStore::new())
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, Claims, JwtAuthProvider},
        entity::Entity,
        envelope::{LinkBuilder, Linked, RequestHint},
        error::{ApiError, ApiResult, EntityError, RequestError, StorageError, ValidationError},
        query::{Document, Filter, Populate, Projection},
        repository::Repository,
        service::{DocumentStore, UpdateOutcome},
        upload::{ImageUpload, UploadPolicy},
        validation::PatchOperation,
    };

    // === Entities ===
    pub use crate::entities::{Order, Product};

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;

    // === Config ===
    pub use crate::config::{AppConfig, StorageConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
