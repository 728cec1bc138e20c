//! Application layer services implementing request workflows.
//!
//! Services drive the domain pipeline on behalf of HTTP handlers: they own
//! per-request concerns such as deadlines and upstream client creation, and
//! translate domain failures into [`crate::error::AppError`].
//!
//! # Available Services
//!
//! - [`services::clicks_service::ClicksService`] - Per-country click averages
//!   for the caller's default group

pub mod services;
