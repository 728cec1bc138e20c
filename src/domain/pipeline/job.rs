//! Messages passed between the pipeline stages.

use crate::domain::entities::MetricSample;
use crate::domain::metrics_api::ApiError;

/// A link to be measured.
///
/// Created by the producer, taken by exactly one worker.
///
/// `seq` is the dispatch position (0-based, in page order) and only serves
/// logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub seq: usize,
    pub link_id: String,
}

impl Job {
    pub fn new(seq: usize, link_id: impl Into<String>) -> Self {
        Self {
            seq,
            link_id: link_id.into(),
        }
    }
}

/// Outcome of one job, sent from a worker to the aggregator.
#[derive(Debug)]
pub struct ResultMessage {
    pub job: Job,
    pub outcome: Result<Vec<MetricSample>, ApiError>,
}

impl ResultMessage {
    pub fn success(job: Job, samples: Vec<MetricSample>) -> Self {
        Self {
            job,
            outcome: Ok(samples),
        }
    }

    pub fn failure(job: Job, error: ApiError) -> Self {
        Self {
            job,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}
