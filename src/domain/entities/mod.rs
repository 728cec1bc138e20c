//! Core domain entities representing the upstream data model.
//!
//! Entities are plain data structures decoded from the link metrics API or
//! built from request input. They carry no business logic beyond small
//! accessors.
//!
//! # Entity Types
//!
//! - [`User`] - The authenticated account and its default group
//! - [`Link`] / [`LinkPage`] - Paginated links of a group
//! - [`CountryMetrics`] / [`MetricSample`] - Per-country clicks for one link
//! - [`MetricsWindow`] - Reporting window for metric queries
//! - [`Credential`] - Caller credential forwarded upstream

pub mod credential;
pub mod link;
pub mod metric;
pub mod user;

pub use credential::Credential;
pub use link::{Link, LinkPage, Pagination};
pub use metric::{CountryMetrics, MetricSample, MetricsWindow};
pub use user::{Email, User};
