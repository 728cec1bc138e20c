//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`             - Liveness check (public)
//! - `GET /v1/clicks/country`  - Per-country averages (credential required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - `Authorization: <scheme> <token>` forwarded upstream
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::protected_routes().route_layer(middleware::from_fn(auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// [`router`] wrapped so that `/v1/clicks/country/` matches as well.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
