//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`bitly`] - HTTP client for the upstream link metrics API

pub mod bitly;
