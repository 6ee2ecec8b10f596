//! Entity registry collecting the route sets of every served resource

use axum::Router;
use indexmap::IndexMap;

/// Trait that describes how to build routes for an entity
///
/// Each resource (Product, Order) implements this trait to provide its
/// routes, with its own state already applied.
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "product")
    fn entity_type(&self) -> &str;

    /// The plural form, also the URL segment (e.g., "products")
    fn plural(&self) -> &str;

    /// Build the routes for this entity
    ///
    /// Typically:
    /// - GET /{plural}
    /// - POST /{plural}
    /// - GET /{plural}/{id}
    fn build_routes(&self) -> Router;
}

/// Registry for all resources of the application
///
/// Descriptors are kept in registration order; registering the same
/// entity type twice replaces the earlier descriptor.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity descriptor under its entity type
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        tracing::debug!(%entity_type, plural = descriptor.plural(), "registering routes");
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of every registered descriptor
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered entity types, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    /// URL segments served, in registration order
    pub fn plurals(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.plural()).collect()
    }
}
