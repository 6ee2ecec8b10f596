//! Hyperlinked response envelopes
//!
//! Every successful payload travels with a `request` object hinting at a
//! related or follow-up call, so a client can walk the API from any
//! response:
//!
//! ```json
//! { "_id": "…", "name": "Lamp", "request": { "type": "GET", "url": "http://localhost:3000/products/…" } }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Discovery hint describing a related call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestHint {
    /// HTTP method or a symbolic operation name (e.g. `GET_ALL_ORDERS`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Canonical URL of the related call
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample body for calls that expect one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestHint {
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
            description: None,
            body: None,
        }
    }

    /// Shorthand for a plain `GET` hint
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A payload flattened next to its `request` hint
#[derive(Debug, Clone, Serialize)]
pub struct Linked<T> {
    #[serde(flatten)]
    pub item: T,
    pub request: RequestHint,
}

impl<T> Linked<T> {
    pub fn new(item: T, request: RequestHint) -> Self {
        Self { item, request }
    }
}

/// Builds canonical URLs from the configured public base URL
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: Arc<str>,
}

impl LinkBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<resource>`
    pub fn collection(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// `<base>/<resource>/<id>`
    pub fn item(&self, resource: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, resource, id)
    }

    /// `GET <base>/<resource>/<id>` self-link
    pub fn self_link(&self, resource: &str, id: &str) -> RequestHint {
        RequestHint::get(self.item(resource, id))
    }
}
