//! Link metrics API contract consumed by the aggregation pipeline.
//!
//! The trait abstracts the remote API so the pipeline can be driven by the
//! HTTP client in production and by mocks or scripted fakes in tests.
//!
//! # Implementations
//!
//! - [`crate::infrastructure::bitly::BitlyClient`] - `reqwest`-backed client
//! - Test mocks available with `cfg(test)`

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{CountryMetrics, Credential, LinkPage, User};

/// Failure of a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The upstream API answered with a non-success status.
    #[error("{message} ({status})")]
    Upstream { status: u16, message: String },

    /// The request never produced a response.
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("invalid upstream response: {0}")]
    Decode(String),

    /// The request deadline fired before the call completed.
    #[error("request deadline exceeded")]
    Cancelled,
}

impl ApiError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Authenticated access to one account's links and their metrics.
///
/// Every call observes `cancel` and returns [`ApiError::Cancelled`] promptly
/// once it fires. Every call made through an instance increments its call
/// counter, whether or not it succeeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkMetricsApi: Send + Sync {
    /// Fetches the account owning the credential.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] on a non-success response.
    async fn current_user(&self, cancel: &CancellationToken) -> Result<User, ApiError>;

    /// Fetches one page of links in a group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] on a non-success response.
    async fn list_links(
        &self,
        group_guid: &str,
        size: u32,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<LinkPage, ApiError>;

    /// Fetches the countries breakdown of clicks for one link.
    ///
    /// A failure here only concerns this link.
    async fn country_metrics(
        &self,
        link_id: &str,
        unit: &str,
        units: i64,
        cancel: &CancellationToken,
    ) -> Result<CountryMetrics, ApiError>;

    /// Number of upstream calls made so far. Safe to read while calls are in flight.
    fn call_count(&self) -> usize;
}

/// Creates per-request API clients bound to a caller credential.
#[cfg_attr(test, mockall::automock)]
pub trait LinkMetricsApiFactory: Send + Sync {
    fn connect(&self, credential: &Credential) -> Arc<dyn LinkMetricsApi>;
}
