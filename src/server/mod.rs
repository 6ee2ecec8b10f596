//! Server module for building the HTTP server
//!
//! This module provides a `ServerBuilder` that registers:
//! - routes for every resource (products, orders)
//! - health checks and static serving of uploaded images
//! - a JSON fallback for unknown routes

pub mod builder;
pub mod entity_registry;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use host::ServerHost;
