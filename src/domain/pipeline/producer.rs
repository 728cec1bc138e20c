//! Link enumeration feeding the job queue.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::PipelineError;
use super::coordinator::CompletionCoordinator;
use super::job::Job;
use crate::domain::metrics_api::LinkMetricsApi;

/// Which links of which group to enumerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkListing {
    pub group_guid: String,
    pub page_size: u32,
    /// First page to request (1-based).
    pub start_page: u32,
}

impl LinkListing {
    pub fn new(group_guid: impl Into<String>, page_size: u32, start_page: u32) -> Self {
        Self {
            group_guid: group_guid.into(),
            page_size,
            start_page,
        }
    }
}

/// What the producer dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub pages: usize,
    pub dispatched: usize,
}

/// Walks the group's link pages and dispatches one job per link, in page order.
///
/// Pages are requested from `listing.start_page` upwards until the upstream
/// cursor is empty; a short page does not end the walk. Each job is registered
/// with the coordinator before it is queued. Enumeration is reported finished
/// to the coordinator on every exit path, and the queue is closed when the
/// sender is dropped on return.
///
/// # Errors
///
/// Returns [`PipelineError::Listing`] on the first failed page fetch and
/// [`PipelineError::QueueClosed`] if no worker is left to take jobs.
pub async fn produce_jobs(
    api: &dyn LinkMetricsApi,
    listing: &LinkListing,
    jobs: mpsc::Sender<Job>,
    coordinator: &CompletionCoordinator,
    cancel: &CancellationToken,
) -> Result<ProducerReport, PipelineError> {
    let result = enumerate(api, listing, &jobs, coordinator, cancel).await;
    drop(jobs);
    coordinator.finish_enumeration();
    result
}

async fn enumerate(
    api: &dyn LinkMetricsApi,
    listing: &LinkListing,
    jobs: &mpsc::Sender<Job>,
    coordinator: &CompletionCoordinator,
    cancel: &CancellationToken,
) -> Result<ProducerReport, PipelineError> {
    let mut report = ProducerReport::default();
    let mut page = listing.start_page;

    loop {
        let links = api
            .list_links(&listing.group_guid, listing.page_size, page, cancel)
            .await
            .map_err(PipelineError::Listing)?;
        report.pages += 1;

        debug!(page, links = links.links.len(), "Fetched link page");

        for link in links.links.iter() {
            coordinator.register();
            let job = Job::new(report.dispatched, link.id.clone());
            if jobs.send(job).await.is_err() {
                coordinator.withdraw();
                return Err(PipelineError::QueueClosed);
            }
            report.dispatched += 1;
        }

        if links.next_cursor().is_none() {
            break;
        }
        page += 1;
    }

    Ok(report)
}
