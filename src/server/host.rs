//! Server host holding the shared application state
//!
//! The host is built once at startup and is the single source of truth
//! for everything the resource descriptors need: the document store, the
//! auth provider, the upload policy and the public link builder.

use crate::config::AppConfig;
use crate::core::auth::AuthProvider;
use crate::core::envelope::LinkBuilder;
use crate::core::service::DocumentStore;
use crate::core::upload::UploadPolicy;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(config, store, auth);
/// let products = ProductDescriptor::new(&host);
/// ```
#[derive(Clone)]
pub struct ServerHost {
    /// Configuration the server was started with
    pub config: Arc<AppConfig>,

    /// Persistence for every resource
    pub store: Arc<dyn DocumentStore>,

    /// Verifies bearer tokens on protected routes
    pub auth: Arc<dyn AuthProvider>,

    /// Rules for image uploads
    pub uploads: Arc<UploadPolicy>,

    /// Canonical URL builder for `request` hints
    pub links: LinkBuilder,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let uploads = Arc::new(UploadPolicy::from_config(&config.uploads));
        let links = LinkBuilder::new(&config.server.public_url);

        Self {
            config: Arc::new(config),
            store,
            auth,
            uploads,
            links,
        }
    }
}
