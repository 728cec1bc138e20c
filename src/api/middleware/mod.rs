//! HTTP middleware for request processing.
//!
//! Provides credential extraction and observability middleware.

pub mod auth;
pub mod tracing;
