//! Entity descriptor for Order

use super::handlers::{OrderAppState, create_order, delete_order, get_order, list_orders};
use super::model::Order;
use crate::core::entity::Entity;
use crate::core::repository::Repository;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::host::ServerHost;
use axum::{Router, routing::get};

/// Descriptor for the Order entity
pub struct OrderDescriptor {
    pub state: OrderAppState,
}

impl OrderDescriptor {
    pub fn new(host: &ServerHost) -> Self {
        Self {
            state: OrderAppState {
                orders: Repository::new(host.store.clone()),
                products: Repository::new(host.store.clone()),
                links: host.links.clone(),
            },
        }
    }
}

impl EntityDescriptor for OrderDescriptor {
    fn entity_type(&self) -> &str {
        Order::resource_name_singular()
    }

    fn plural(&self) -> &str {
        Order::resource_name()
    }

    fn build_routes(&self) -> Router {
        Router::new()
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/{id}", get(get_order).delete(delete_order))
            .with_state(self.state.clone())
    }
}
