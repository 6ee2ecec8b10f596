//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoStore;

use crate::config::StorageConfig;
use crate::core::DocumentStore;
use anyhow::Result;
use std::sync::Arc;

/// Open the store selected by configuration
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config {
        StorageConfig::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(InMemoryStore::new()))
        }

        #[cfg(feature = "mongodb_backend")]
        StorageConfig::Mongodb { uri, database } => {
            tracing::info!(%database, "connecting to MongoDB");
            Ok(Arc::new(MongoStore::connect(uri, database).await?))
        }

        #[cfg(not(feature = "mongodb_backend"))]
        StorageConfig::Mongodb { .. } => Err(anyhow::anyhow!(
            "MongoDB storage requested but the 'mongodb_backend' feature is disabled"
        )),
    }
}
