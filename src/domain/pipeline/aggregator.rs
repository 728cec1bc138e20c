//! Single-owner fold of worker results into per-country totals.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::coordinator::CompletionCoordinator;
use super::job::{Job, ResultMessage};
use crate::domain::metrics_api::ApiError;

/// Average clicks per link for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryAverage {
    pub country: String,
    pub average: f32,
}

/// Final per-country averages over all links of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryReport {
    /// Number of links the averages are taken over.
    pub total: usize,
    /// Sorted by country.
    pub averages: Vec<CountryAverage>,
}

/// A per-link failure retained by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub job: Job,
    pub error: ApiError,
}

/// Running totals owned by the aggregator task.
///
/// Failures are sticky: the first one is kept, later ones are only counted,
/// and a state holding a failure never produces a report.
#[derive(Debug, Default)]
pub struct AggregateState {
    clicks: HashMap<String, u64>,
    links: usize,
    failures: usize,
    first_failure: Option<JobFailure>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one result into the totals.
    pub fn fold(&mut self, message: ResultMessage) {
        match message.outcome {
            Ok(samples) => {
                for sample in samples {
                    *self.clicks.entry(sample.country).or_default() += sample.clicks;
                }
                self.links += 1;
            }
            Err(error) => {
                self.failures += 1;
                if self.first_failure.is_none() {
                    self.first_failure = Some(JobFailure {
                        job: message.job,
                        error,
                    });
                }
            }
        }
    }

    /// Links whose metrics were folded in.
    pub fn links(&self) -> usize {
        self.links
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    #[cfg(test)]
    pub(crate) fn clicks(&self, country: &str) -> Option<u64> {
        self.clicks.get(country).copied()
    }

    pub fn first_failure(&self) -> Option<&JobFailure> {
        self.first_failure.as_ref()
    }

    /// Converts the totals into averages sorted by country.
    ///
    /// # Errors
    ///
    /// Returns the first recorded failure; partial totals are discarded.
    pub fn into_report(self) -> Result<CountryReport, JobFailure> {
        if let Some(failure) = self.first_failure {
            return Err(failure);
        }

        let total = self.links;
        let mut averages: Vec<CountryAverage> = self
            .clicks
            .into_iter()
            .map(|(country, clicks)| CountryAverage {
                country,
                average: clicks as f32 / total as f32,
            })
            .collect();
        averages.sort_by(|a, b| a.country.cmp(&b.country));

        Ok(CountryReport { total, averages })
    }
}

/// Consumes results until the coordinator reports completion.
///
/// Every message, success or failure, is accounted for exactly once. The
/// receiver is closed before returning so late senders fail fast.
pub async fn run_aggregator(
    mut rx: mpsc::Receiver<ResultMessage>,
    coordinator: Arc<CompletionCoordinator>,
) -> AggregateState {
    let mut state = AggregateState::new();
    let mut completion = coordinator.subscribe();

    loop {
        tokio::select! {
            biased;

            message = rx.recv() => {
                let Some(message) = message else {
                    debug!("Result channel closed");
                    break;
                };

                if let Err(error) = &message.outcome
                    && !error.is_cancelled()
                {
                    warn!(link = %message.job.link_id, %error, "Link metrics failed");
                }

                state.fold(message);

                if coordinator.account_for() {
                    break;
                }
            }

            _ = completion.wait_for(|done| *done) => break,
        }
    }

    rx.close();

    debug!(
        links = state.links(),
        failures = state.failures(),
        countries = state.clicks.len(),
        first_failure = state.first_failure().map(|f| f.job.link_id.as_str()),
        "Aggregation finished"
    );

    state
}
