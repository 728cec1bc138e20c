//! Concurrent fan-out/fan-in of per-link metric fetches.
//!
//! # Stages
//!
//! 1. [`producer::produce_jobs`] walks link pages and queues one [`job::Job`] per link
//! 2. [`worker_pool::WorkerPool`] fetches metrics for queued jobs in parallel
//! 3. [`aggregator::run_aggregator`] folds [`job::ResultMessage`]s into the
//!    [`aggregator::AggregateState`] it exclusively owns
//! 4. [`coordinator::CompletionCoordinator`] ends aggregation once every
//!    dispatched job is accounted for
//!
//! Stages talk only through channels. The outstanding-job counter is the only
//! value written by more than one task.
//!
//! [`spawn_pipeline`] runs all stages on a driver task that joins every task it
//! started, so abandoning the returned receiver never leaks work.

pub mod aggregator;
pub mod coordinator;
pub mod deadline;
pub mod job;
pub mod producer;
pub mod worker_pool;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::entities::MetricsWindow;
use crate::domain::metrics_api::{ApiError, LinkMetricsApi};

pub use aggregator::{AggregateState, CountryAverage, CountryReport, JobFailure};
pub use coordinator::CompletionCoordinator;
pub use deadline::Deadline;
pub use job::{Job, ResultMessage};
pub use producer::{LinkListing, ProducerReport};
pub use worker_pool::WorkerPool;

/// Failure of the aggregation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A link page could not be fetched.
    #[error("{0}")]
    Listing(ApiError),

    /// A link's metrics could not be fetched (first failure wins).
    #[error("{error}")]
    Job { link_id: String, error: ApiError },

    #[error("worker pool stopped before all links were dispatched")]
    QueueClosed,

    #[error("aggregation task failed: {0}")]
    Task(String),
}

impl From<JobFailure> for PipelineError {
    fn from(failure: JobFailure) -> Self {
        Self::Job {
            link_id: failure.job.link_id,
            error: failure.error,
        }
    }
}

/// Sizing of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Capacity of the bounded job queue.
    pub queue_capacity: usize,
}

impl PipelineConfig {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_capacity: workers,
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(16)
    }
}

/// What to aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub listing: LinkListing,
    pub window: MetricsWindow,
}

pub type PipelineOutcome = Result<CountryReport, PipelineError>;

/// Starts the pipeline and returns a receiver for its single outcome.
///
/// A listing failure is sent as soon as it happens; in-flight work is then
/// cancelled and drained in the background. Otherwise the outcome is sent once
/// aggregation has finished. The driver keeps running until every worker and
/// the aggregator have exited, whether or not the receiver is still alive.
pub fn spawn_pipeline(
    api: Arc<dyn LinkMetricsApi>,
    request: PipelineRequest,
    config: PipelineConfig,
    cancel: CancellationToken,
) -> oneshot::Receiver<PipelineOutcome> {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    tokio::spawn(drive(api, request, config, cancel, outcome_tx));
    outcome_rx
}

async fn drive(
    api: Arc<dyn LinkMetricsApi>,
    request: PipelineRequest,
    config: PipelineConfig,
    cancel: CancellationToken,
    outcome_tx: oneshot::Sender<PipelineOutcome>,
) {
    let coordinator = Arc::new(CompletionCoordinator::new());
    let (job_tx, job_rx) = mpsc::channel(config.queue_capacity.max(1));
    let (result_tx, result_rx) = mpsc::channel(config.workers.max(1));

    let pool = WorkerPool::spawn(
        config.workers,
        api.clone(),
        request.window,
        job_rx,
        result_tx,
        cancel.clone(),
    );
    let aggregator = tokio::spawn(aggregator::run_aggregator(result_rx, coordinator.clone()));

    let mut outcome_tx = Some(outcome_tx);

    match producer::produce_jobs(
        api.as_ref(),
        &request.listing,
        job_tx,
        &coordinator,
        &cancel,
    )
    .await
    {
        Ok(report) => debug!(
            pages = report.pages,
            links = report.dispatched,
            "Link enumeration finished"
        ),
        Err(e) => {
            cancel.cancel();
            if let Some(tx) = outcome_tx.take() {
                let _ = tx.send(Err(e));
            }
        }
    }

    let state = aggregator.await;
    let processed = pool.join().await;

    let outcome = match state {
        Ok(state) => state.into_report().map_err(PipelineError::from),
        Err(e) => Err(PipelineError::Task(e.to_string())),
    };

    info!(
        dispatched = coordinator.dispatched(),
        processed,
        api_calls = api.call_count(),
        succeeded = outcome.is_ok(),
        "Pipeline drained"
    );

    if let Some(tx) = outcome_tx.take()
        && tx.send(outcome).is_err()
    {
        debug!("Pipeline outcome discarded, request already answered");
    }
}
