//! Typed error handling for the storefront API
//!
//! Every failure a handler can produce is expressed as an [`ApiError`].
//! Each category maps to an HTTP status code and a stable error code so
//! that clients can match on `code` instead of parsing messages.
//!
//! # Error Categories
//!
//! - [`EntityError`]: requested or referenced entity is absent
//! - [`RequestError`]: authentication and routing failures
//! - [`ValidationError`]: malformed or invalid input
//! - [`UploadError`]: rejected multipart uploads
//! - [`StorageError`]: document store failures
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! async fn load(repo: &Repository<Product>, id: &str) -> ApiResult<Product> {
//!     repo.find_by_id(id, &Projection::All, None)
//!         .await?
//!         .ok_or_else(|| EntityError::not_found("product", id).into())
//! }
//! ```

use crate::core::envelope::RequestHint;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the storefront API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity lookups that came back empty
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Authentication and routing errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Multipart upload rejections
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Document store errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error decorated with a follow-up request hint
    #[error("{source}")]
    Hinted {
        source: Box<ApiError>,
        request: RequestHint,
    },

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Optional discovery hint for a related call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestHint>,
}

impl ApiError {
    /// Attach a follow-up request hint to this error
    pub fn with_request(self, request: RequestHint) -> Self {
        ApiError::Hinted {
            source: Box::new(self),
            request,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Entity(e) => e.status_code(),
            ApiError::Request(e) => e.status_code(),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status_code(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Hinted { source, .. } => source.status_code(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Entity(e) => e.error_code(),
            ApiError::Request(e) => e.error_code(),
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Upload(e) => e.error_code(),
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Hinted { source, .. } => source.error_code(),
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let request = match self {
            ApiError::Hinted { request, .. } => Some(request.clone()),
            _ => None,
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
            request,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id,
                }))
            }
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ApiError::Upload(UploadError::TooLarge { limit }) => {
                Some(serde_json::json!({ "max_file_size": limit }))
            }
            ApiError::Upload(UploadError::UnsupportedMediaType { allowed, .. }) => {
                Some(serde_json::json!({ "allowed": allowed }))
            }
            ApiError::Hinted { source, .. } => source.details(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        } else {
            tracing::debug!(code = self.error_code(), status = %status, "{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },
}

impl EntityError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// No route matches the request
    #[error("No route for {method} {path}")]
    RouteNotFound { method: String, path: String },
}

impl RequestError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        RequestError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Multiple field validation errors
    #[error("Validation errors: {}", summarize(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Body could not be parsed
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn summarize(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.into())
    }
}

// =============================================================================
// Upload Errors
// =============================================================================

/// Errors raised while receiving a multipart upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// File MIME type is not on the allow-list
    #[error("Unsupported image format '{content_type}'")]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    /// File exceeds the configured size limit
    #[error("File exceeds the maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    /// Required file part is absent
    #[error("Missing file field '{field}'")]
    MissingFile { field: String },

    /// A file arrived under an unexpected field, or more than once
    #[error("Unexpected file field '{field}'")]
    UnexpectedFile { field: String },

    /// The multipart stream itself was malformed
    #[error("Malformed multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    /// Writing the file to storage failed
    #[error("Failed to store upload: {message}")]
    Io { message: String },
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::MissingFile { .. } => StatusCode::BAD_REQUEST,
            UploadError::UnexpectedFile { .. } => StatusCode::BAD_REQUEST,
            UploadError::Multipart { status, .. } => *status,
            UploadError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            UploadError::TooLarge { .. } => "FILE_TOO_LARGE",
            UploadError::MissingFile { .. } => "MISSING_FILE",
            UploadError::UnexpectedFile { .. } => "UNEXPECTED_FILE",
            UploadError::Multipart { .. } => "MALFORMED_MULTIPART",
            UploadError::Io { .. } => "UPLOAD_IO_ERROR",
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for UploadError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        UploadError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Any operation the backend rejected
    #[error("Store operation failed: {message}")]
    OperationFailed { message: String },
}

/// Store adapters report failures through `anyhow`
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(StorageError::OperationFailed {
            message: format!("{:#}", err),
        })
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_deref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for storefront handlers
pub type ApiResult<T> = Result<T, ApiError>;
