//! Entity trait defining the core abstraction for stored resources

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all entities in the system.
///
/// Each entity lives in its own collection named after the plural
/// resource name, which is also the URL segment it is served under.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in URLs and as collection name (e.g. "products")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g. "product")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> &str;
}

/// Generate a fresh opaque identifier for a new entity
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
