//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::host::ServerHost;
use super::router::build_router;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, JwtAuthProvider};
use crate::core::service::DocumentStore;
use crate::entities::{OrderDescriptor, ProductDescriptor};
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the storefront HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(config)
///     .with_store(InMemoryStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn DocumentStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder from loaded configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            auth: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the document store (required)
    pub fn with_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a document store that the caller keeps a handle on
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the JWT provider derived from `auth.jwt_secret`
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes outside the resource pattern, such as a token
    /// endpoint or a webhook.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the shared host state
    pub fn build_host(&mut self) -> Result<ServerHost> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow!("DocumentStore is required. Call .with_store()"))?;

        let auth = match self.auth.take() {
            Some(auth) => auth,
            None => {
                if self.config.auth.jwt_secret.trim().is_empty() {
                    return Err(anyhow!(
                        "No token secret configured. Set auth.jwt_secret or call .with_auth_provider()"
                    ));
                }
                Arc::new(JwtAuthProvider::new(
                    &self.config.auth.jwt_secret,
                    self.config.auth.token_ttl_secs,
                ))
            }
        };

        Ok(ServerHost::new(self.config.clone(), store, auth))
    }

    /// Build the final router
    ///
    /// This generates:
    /// - routes for products and orders
    /// - health and upload routes
    /// - any custom routes
    pub fn build(mut self) -> Result<Router> {
        let host = self.build_host()?;

        let mut registry = EntityRegistry::new();
        registry.register(Box::new(ProductDescriptor::new(&host)));
        registry.register(Box::new(OrderDescriptor::new(&host)));

        let custom_routes = std::mem::take(&mut self.custom_routes);
        Ok(build_router(&host, &registry, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured host and port
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for SIGTERM or Ctrl+C
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
