//! Entity descriptor for Product

use super::handlers::{
    ProductAppState, create_product, delete_product, get_product, list_products, update_product,
};
use super::model::Product;
use crate::core::entity::Entity;
use crate::core::repository::Repository;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::host::ServerHost;
use axum::{Router, routing::get};

/// Descriptor for the Product entity
pub struct ProductDescriptor {
    pub state: ProductAppState,
}

impl ProductDescriptor {
    pub fn new(host: &ServerHost) -> Self {
        Self {
            state: ProductAppState {
                products: Repository::new(host.store.clone()),
                auth: host.auth.clone(),
                uploads: host.uploads.clone(),
                links: host.links.clone(),
            },
        }
    }
}

impl EntityDescriptor for ProductDescriptor {
    fn entity_type(&self) -> &str {
        Product::resource_name_singular()
    }

    fn plural(&self) -> &str {
        Product::resource_name()
    }

    fn build_routes(&self) -> Router {
        Router::new()
            .route("/products", get(list_products).post(create_product))
            .route(
                "/products/{id}",
                get(get_product)
                    .patch(update_product)
                    .delete(delete_product),
            )
            .with_state(self.state.clone())
    }
}
