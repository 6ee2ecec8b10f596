//! Order entity module

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::OrderDescriptor;
pub use handlers::*;
pub use model::{CreateOrderRequest, Order, ProductRef, ProductSummary};
