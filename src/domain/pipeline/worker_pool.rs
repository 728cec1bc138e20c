//! Fixed-size pool of tasks fetching per-link country metrics.
//!
//! Workers count fetches and failed fetches through the `metrics` facade.
//! No recorder is installed by this crate: exporting the counters is left to
//! the embedding binary, and without a recorder the counters are no-ops.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::job::{Job, ResultMessage};
use crate::domain::entities::MetricsWindow;
use crate::domain::metrics_api::LinkMetricsApi;

/// Metrics fetch attempts, successful or not.
pub const LINK_METRICS_FETCHED: &str = "link_metrics_fetched_total";
/// Metrics fetch attempts that ended in an error, cancellations included.
pub const LINK_METRICS_FAILED: &str = "link_metrics_failed_total";

/// Registers descriptions of the worker counters with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(
        LINK_METRICS_FETCHED,
        "Per-link country metrics fetches attempted by pipeline workers"
    );
    metrics::describe_counter!(
        LINK_METRICS_FAILED,
        "Per-link country metrics fetches that failed"
    );
}

/// Shared receiving end of the job queue.
type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Handles of the running workers.
///
/// Each worker takes the next job from the shared queue, fetches the link's
/// metrics and sends exactly one [`ResultMessage`] for it. A failed fetch is
/// reported, never retried, and the worker moves on. Workers exit when the
/// queue is closed and drained, or when the result channel is closed.
pub struct WorkerPool {
    handles: Vec<JoinHandle<usize>>,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one) on the current runtime.
    pub fn spawn(
        size: usize,
        api: Arc<dyn LinkMetricsApi>,
        window: MetricsWindow,
        jobs: mpsc::Receiver<Job>,
        results: mpsc::Sender<ResultMessage>,
        cancel: CancellationToken,
    ) -> Self {
        let queue: JobQueue = Arc::new(Mutex::new(jobs));
        let window = Arc::new(window);

        let handles = (0..size.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    api.clone(),
                    window.clone(),
                    queue.clone(),
                    results.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit and returns the number of jobs processed.
    pub async fn join(self) -> usize {
        let mut processed = 0;
        for handle in self.handles {
            match handle.await {
                Ok(count) => processed += count,
                Err(e) => error!("Worker task failed: {}", e),
            }
        }
        processed
    }
}

async fn run_worker(
    id: usize,
    api: Arc<dyn LinkMetricsApi>,
    window: Arc<MetricsWindow>,
    queue: JobQueue,
    results: mpsc::Sender<ResultMessage>,
    cancel: CancellationToken,
) -> usize {
    let mut processed = 0;

    loop {
        // The lock is held only while waiting for the next job.
        let job = { queue.lock().await.recv().await };
        let Some(job) = job else {
            break;
        };

        let message = match api
            .country_metrics(&job.link_id, &window.unit, window.units, &cancel)
            .await
        {
            Ok(metrics) => ResultMessage::success(job, metrics.metrics),
            Err(error) => ResultMessage::failure(job, error),
        };

        metrics::counter!(LINK_METRICS_FETCHED).increment(1);
        if !message.is_success() {
            metrics::counter!(LINK_METRICS_FAILED).increment(1);
        }

        processed += 1;

        if results.send(message).await.is_err() {
            debug!(worker = id, "Result channel closed, worker stopping");
            break;
        }
    }

    debug!(worker = id, processed, "Worker finished");
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CountryMetrics, MetricSample};
    use crate::domain::metrics_api::{ApiError, MockLinkMetricsApi};
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn window() -> MetricsWindow {
        MetricsWindow::new("day", 30)
    }

    #[tokio::test]
    async fn test_each_job_produces_one_result() {
        let mut api = MockLinkMetricsApi::new();
        api.expect_country_metrics()
            .withf(|_, unit, units, _| unit == "day" && *units == 30)
            .times(20)
            .returning(|link, _, _, _| {
                Ok(CountryMetrics::from_samples(vec![MetricSample::new(
                    link.to_string(),
                    1,
                )]))
            });

        let (job_tx, job_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(64);

        let pool = WorkerPool::spawn(
            3,
            Arc::new(api),
            window(),
            job_rx,
            result_tx,
            CancellationToken::new(),
        );
        assert_eq!(pool.size(), 3);

        for seq in 0..20 {
            job_tx.send(Job::new(seq, format!("link{}", seq))).await.unwrap();
        }
        drop(job_tx);

        assert_eq!(pool.join().await, 20);

        let mut seen = HashSet::new();
        while let Some(msg) = result_rx.recv().await {
            let samples = msg.outcome.unwrap();
            assert_eq!(samples[0].country, msg.job.link_id);
            assert!(seen.insert(msg.job.seq), "job {} reported twice", msg.job.seq);
        }
        assert_eq!(seen.len(), 20);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_worker() {
        let mut api = MockLinkMetricsApi::new();
        api.expect_country_metrics()
            .withf(|link, _, _, _| link == "bad")
            .times(1)
            .returning(|_, _, _, _| Err(ApiError::upstream(500, "BOOM")));
        api.expect_country_metrics()
            .withf(|link, _, _, _| link != "bad")
            .times(2)
            .returning(|_, _, _, _| Ok(CountryMetrics::default()));

        let (job_tx, job_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(8);

        let pool = WorkerPool::spawn(
            1,
            Arc::new(api),
            window(),
            job_rx,
            result_tx,
            CancellationToken::new(),
        );

        job_tx.send(Job::new(0, "good1")).await.unwrap();
        job_tx.send(Job::new(1, "bad")).await.unwrap();
        job_tx.send(Job::new(2, "good2")).await.unwrap();
        drop(job_tx);

        assert_eq!(pool.join().await, 3);

        let mut failures = 0;
        let mut successes = 0;
        while let Some(msg) = result_rx.recv().await {
            match msg.outcome {
                Ok(_) => successes += 1,
                Err(e) => {
                    assert_eq!(msg.job.link_id, "bad");
                    assert_eq!(e, ApiError::upstream(500, "BOOM"));
                    failures += 1;
                }
            }
        }
        assert_eq!((successes, failures), (2, 1));
    }

    /// Recorder keeping counter totals by name.
    #[derive(Default)]
    struct CountingRecorder {
        counters: std::sync::Mutex<HashMap<String, Arc<AtomicU64>>>,
        described: std::sync::Mutex<Vec<String>>,
    }

    impl CountingRecorder {
        fn total(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(name)
                .map(|c| c.load(Ordering::SeqCst))
                .unwrap_or(0)
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, key: KeyName, _unit: Option<Unit>, _description: SharedString) {
            self.described.lock().unwrap().push(key.as_str().to_string());
        }

        fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

        fn describe_histogram(
            &self,
            _key: KeyName,
            _unit: Option<Unit>,
            _description: SharedString,
        ) {
        }

        fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
            let counter = self
                .counters
                .lock()
                .unwrap()
                .entry(key.name().to_string())
                .or_default()
                .clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[tokio::test]
    async fn test_fetch_counters_are_recorded() {
        let recorder = CountingRecorder::default();
        // Thread-local; the current-thread runtime polls the workers here too.
        let _guard = metrics::set_default_local_recorder(&recorder);

        describe_metrics();
        assert_eq!(
            *recorder.described.lock().unwrap(),
            vec![LINK_METRICS_FETCHED, LINK_METRICS_FAILED]
        );

        let mut api = MockLinkMetricsApi::new();
        api.expect_country_metrics()
            .withf(|link, _, _, _| link == "bad")
            .returning(|_, _, _, _| Err(ApiError::upstream(404, "NOT_FOUND")));
        api.expect_country_metrics()
            .withf(|link, _, _, _| link != "bad")
            .returning(|_, _, _, _| Ok(CountryMetrics::default()));

        let (job_tx, job_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(8);

        let pool = WorkerPool::spawn(
            2,
            Arc::new(api),
            window(),
            job_rx,
            result_tx,
            CancellationToken::new(),
        );

        for (seq, link) in ["a", "bad", "b"].into_iter().enumerate() {
            job_tx.send(Job::new(seq, link)).await.unwrap();
        }
        drop(job_tx);

        assert_eq!(pool.join().await, 3);
        while result_rx.recv().await.is_some() {}

        assert_eq!(recorder.total(LINK_METRICS_FETCHED), 3);
        assert_eq!(recorder.total(LINK_METRICS_FAILED), 1);
    }

    #[tokio::test]
    async fn test_zero_size_spawns_one_worker() {
        let api = MockLinkMetricsApi::new();
        let (job_tx, job_rx) = mpsc::channel(1);
        let (result_tx, _result_rx) = mpsc::channel(1);

        let pool = WorkerPool::spawn(
            0,
            Arc::new(api),
            window(),
            job_rx,
            result_tx,
            CancellationToken::new(),
        );
        assert_eq!(pool.size(), 1);

        drop(job_tx);
        assert_eq!(pool.join().await, 0);
    }

    #[tokio::test]
    async fn test_workers_stop_when_results_closed() {
        let mut api = MockLinkMetricsApi::new();
        api.expect_country_metrics()
            .returning(|_, _, _, _| Ok(CountryMetrics::default()));

        let (job_tx, job_rx) = mpsc::channel(8);
        let (result_tx, result_rx) = mpsc::channel(1);
        drop(result_rx);

        let pool = WorkerPool::spawn(
            2,
            Arc::new(api),
            window(),
            job_rx,
            result_tx,
            CancellationToken::new(),
        );

        for seq in 0..2 {
            job_tx.send(Job::new(seq, "x")).await.unwrap();
        }

        // Both workers exit after their first failed send even though the queue stays open.
        assert_eq!(pool.join().await, 2);
    }
}
