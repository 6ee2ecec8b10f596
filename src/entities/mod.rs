//! Resources served by the API

pub mod order;
pub mod product;

pub use order::{Order, OrderDescriptor};
pub use product::{Product, ProductDescriptor};
