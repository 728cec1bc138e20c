//! Business logic services for the application layer.

pub mod clicks_service;

pub use clicks_service::{ClicksQuery, ClicksReport, ClicksService, ClicksSettings, RequestPhase};
