//! Core module containing fundamental traits and types for the API

pub mod auth;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod query;
pub mod repository;
pub mod service;
pub mod upload;
pub mod validation;

pub use auth::{AuthContext, AuthProvider, JwtAuthProvider};
pub use entity::Entity;
pub use envelope::{LinkBuilder, Linked, RequestHint};
pub use error::{ApiError, ApiResult};
pub use query::{Document, Filter, Populate, Projection};
pub use repository::Repository;
pub use service::{DocumentStore, UpdateOutcome};
pub use upload::{ImageUpload, UploadPolicy};
