//! Domain layer containing entities, the upstream API contract and the
//! aggregation pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Data decoded from the link metrics API
//! - [`metrics_api`] - Trait the pipeline uses to reach the upstream API
//! - [`pipeline`] - Job producer, worker pool, aggregator and completion tracking
//!
//! The domain layer does not depend on HTTP or on a concrete API client;
//! implementations of [`metrics_api::LinkMetricsApi`] live in
//! [`crate::infrastructure`].

pub mod entities;
pub mod metrics_api;
pub mod pipeline;
