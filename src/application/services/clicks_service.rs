//! Request lifecycle for per-country click averages.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::entities::{Credential, MetricsWindow};
use crate::domain::metrics_api::{LinkMetricsApi, LinkMetricsApiFactory};
use crate::domain::pipeline::{
    CountryAverage, Deadline, LinkListing, PipelineConfig, PipelineRequest, spawn_pipeline,
};
use crate::error::AppError;

/// Stages a request moves through.
///
/// `Completed`, `TimedOut` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Authenticated,
    ListingLinks,
    Dispatching,
    Completed,
    TimedOut,
    Failed,
}

impl RequestPhase {
    /// Terminal phase for a finished request.
    pub fn of<T>(result: &Result<T, AppError>) -> Self {
        match result {
            Ok(_) => RequestPhase::Completed,
            Err(AppError::Timeout) => RequestPhase::TimedOut,
            Err(_) => RequestPhase::Failed,
        }
    }
}

/// Caller-controlled parameters of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClicksQuery {
    pub window: MetricsWindow,
    pub page_size: u32,
    pub page: u32,
}

impl Default for ClicksQuery {
    fn default() -> Self {
        Self {
            window: MetricsWindow::default(),
            page_size: 10,
            page: 1,
        }
    }
}

/// Per-country averages plus request diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ClicksReport {
    /// Links in the group the averages are taken over.
    pub total: usize,
    /// Upstream calls made for this request.
    pub api_calls: usize,
    pub averages: Vec<CountryAverage>,
}

/// Service settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClicksSettings {
    pub pipeline: PipelineConfig,
    pub request_timeout: Duration,
}

impl Default for ClicksSettings {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Computes average clicks per country over the caller's default group.
///
/// Each request gets its own API client (and call counter) and its own
/// deadline. The deadline covers the user lookup, link enumeration and
/// metric fetches; whichever of completion and deadline comes first decides
/// the answer. Work still running when the deadline wins is cancelled and
/// drained in the background.
pub struct ClicksService {
    api_factory: Arc<dyn LinkMetricsApiFactory>,
    settings: ClicksSettings,
}

impl ClicksService {
    pub fn new(api_factory: Arc<dyn LinkMetricsApiFactory>, settings: ClicksSettings) -> Self {
        Self {
            api_factory,
            settings,
        }
    }

    pub fn settings(&self) -> &ClicksSettings {
        &self.settings
    }

    /// Runs one aggregation request.
    ///
    /// # Errors
    ///
    /// - [`AppError::Timeout`] if the deadline passes first
    /// - [`AppError::Upstream`] if the user lookup, a link page or any link's
    ///   metrics fail upstream (the first link failure wins)
    /// - [`AppError::BadGateway`] if the upstream API is unreachable
    pub async fn country_averages(
        &self,
        credential: &Credential,
        query: ClicksQuery,
    ) -> Result<ClicksReport, AppError> {
        let deadline = Deadline::start(self.settings.request_timeout);
        let api = self.api_factory.connect(credential);
        debug!(phase = ?RequestPhase::Authenticated, scheme = credential.scheme(), "Request phase");

        let result = tokio::select! {
            biased;

            result = self.aggregate(api.clone(), query, deadline.token()) => result,
            _ = deadline.expired() => Err(AppError::Timeout),
        };

        let phase = RequestPhase::of(&result);
        match &result {
            Ok(report) => info!(
                ?phase,
                links = report.total,
                countries = report.averages.len(),
                api_calls = report.api_calls,
                remaining_ms = deadline.remaining().as_millis() as u64,
                "Aggregation completed"
            ),
            Err(AppError::Timeout) => warn!(
                ?phase,
                timeout_ms = self.settings.request_timeout.as_millis() as u64,
                api_calls = api.call_count(),
                "Aggregation timed out"
            ),
            Err(e) => warn!(?phase, error = %e, "Aggregation failed"),
        }

        result
    }

    async fn aggregate(
        &self,
        api: Arc<dyn LinkMetricsApi>,
        query: ClicksQuery,
        cancel: CancellationToken,
    ) -> Result<ClicksReport, AppError> {
        debug!(phase = ?RequestPhase::ListingLinks, "Request phase");
        let user = api.current_user(&cancel).await?;

        let request = PipelineRequest {
            listing: LinkListing::new(user.default_group_guid, query.page_size, query.page),
            window: query.window,
        };

        debug!(
            phase = ?RequestPhase::Dispatching,
            group = %request.listing.group_guid,
            workers = self.settings.pipeline.workers,
            "Request phase"
        );

        let report = spawn_pipeline(
            api.clone(),
            request,
            self.settings.pipeline,
            cancel.child_token(),
        )
        .await
        .map_err(|_| AppError::internal("aggregation stopped without a result"))??;

        Ok(ClicksReport {
            total: report.total,
            api_calls: api.call_count(),
            averages: report.averages,
        })
    }
}
