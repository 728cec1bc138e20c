//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde; query parameters additionally use `serde_with` for
//! lenient number parsing.

pub mod clicks;
pub mod health;
