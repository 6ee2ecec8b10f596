//! Order entity model

use crate::core::entity::{Entity, new_id};
use crate::core::query::{Populate, Projection};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The product an order points at
///
/// Stored as a plain id; reads that populate the reference get the
/// expanded summary instead, or `null` once the product is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(String),
    Expanded(ProductSummary),
    Missing,
}

impl ProductRef {
    /// Id of the referenced product, if still known
    pub fn id(&self) -> Option<&str> {
        match self {
            ProductRef::Id(id) => Some(id),
            ProductRef::Expanded(summary) => Some(&summary.id),
            ProductRef::Missing => None,
        }
    }
}

/// Subset of a product inlined into an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// An order for some quantity of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub product: ProductRef,
    pub quantity: u32,
}

impl Order {
    pub fn new(product_id: &str, quantity: u32) -> Self {
        Self {
            id: new_id(),
            product: ProductRef::Id(product_id.to_string()),
            quantity,
        }
    }

    pub fn projection() -> Projection {
        Projection::fields(&["product", "quantity"])
    }

    /// Expansion used by listings: product name only
    pub fn list_populate() -> Populate {
        Populate::new("product", "products", &["name"])
    }

    /// Expansion used by single reads: product name and price
    pub fn detail_populate() -> Populate {
        Populate::new("product", "products", &["name", "price"])
    }
}

impl Entity for Order {
    fn resource_name() -> &'static str {
        "orders"
    }

    fn resource_name_singular() -> &'static str {
        "order"
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /orders`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[serde(rename = "productId")]
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
}
