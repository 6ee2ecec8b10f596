//! Assembly of the HTTP router
//!
//! Routes served:
//! - GET /health, GET /healthz - liveness
//! - every route of the registered resources
//! - GET /uploads/{file} - stored product images
//! - any custom routes handed to the builder
//!
//! Anything else answers `404 ROUTE_NOT_FOUND` as JSON.

use super::entity_registry::EntityRegistry;
use super::host::ServerHost;
use crate::core::error::{ApiError, RequestError};
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Uri};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the complete application router
pub fn build_router(
    host: &ServerHost,
    registry: &EntityRegistry,
    custom_routes: Vec<Router>,
) -> Router {
    let app = custom_routes
        .into_iter()
        .fold(health_routes().merge(registry.build_routes()), |app, routes| {
            app.merge(routes)
        })
        .nest_service("/uploads", ServeDir::new(&host.uploads.dir))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(host.uploads.body_limit())),
        );

    if host.config.server.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Build health check routes
fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    RequestError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
    .into()
}
