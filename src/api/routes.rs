//! API route configuration.
//!
//! All API endpoints require a credential via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::country_clicks_handler;
use crate::state::AppState;
use axum::{Router, routing::get};

/// All API routes, protected by credential extraction.
///
/// # Endpoints
///
/// - `GET /v1/clicks/country` - Average clicks per link, per country
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/v1/clicks/country", get(country_clicks_handler))
}
