//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service::UserService;

pub use routes::create_router;

/// Build the full application router.
///
/// Layers run outermost first: trace, request id, logging, timeout.
/// When the timeout fires the handler future is dropped, which rolls back
/// any transaction it still holds.
pub fn build_router(service: UserService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(create_router())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
