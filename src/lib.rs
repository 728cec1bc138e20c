//! # Country Clicks
//!
//! An HTTP service that reports, for the caller's default link group, the
//! average number of clicks per link from each country, built with Axum and
//! Tokio on top of a Bitly-style link metrics API.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, the upstream API trait and the
//!   concurrent aggregation pipeline
//! - **Application Layer** ([`application`]) - Request lifecycle and deadline handling
//! - **Infrastructure Layer** ([`infrastructure`]) - `reqwest` client for the upstream API
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Link enumeration across pages with a bounded job queue
//! - Fixed-size worker pool per request
//! - Whole-request deadline with cancellation of in-flight upstream calls
//! - Per-request upstream call counting
//!
//! ## Quick Start
//!
//! ```bash
//! export WORKERS=16
//! export REQUEST_TIMEOUT_SECS=60
//!
//! cargo run -- --listen 127.0.0.1:3000
//!
//! curl -H "Authorization: Bearer $TOKEN" \
//!     "http://127.0.0.1:3000/v1/clicks/country?unit=day&units=30"
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{ClicksQuery, ClicksReport, ClicksService, ClicksSettings};
    pub use crate::domain::entities::{CountryMetrics, Credential, Link, LinkPage, MetricSample, User};
    pub use crate::domain::metrics_api::{ApiError, LinkMetricsApi, LinkMetricsApiFactory};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
