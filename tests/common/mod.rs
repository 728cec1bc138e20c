#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use tokio_util::sync::CancellationToken;

use country_clicks::application::services::{ClicksService, ClicksSettings};
use country_clicks::domain::entities::{CountryMetrics, Credential, LinkPage, MetricSample, User};
use country_clicks::domain::metrics_api::{ApiError, LinkMetricsApi, LinkMetricsApiFactory};
use country_clicks::domain::pipeline::PipelineConfig;
use country_clicks::routes::router;
use country_clicks::state::AppState;

pub const GROUP: &str = "Bg1a2b3c";

pub fn auth_header() -> (HeaderName, HeaderValue) {
    (header::AUTHORIZATION, HeaderValue::from_static("Bearer test-token"))
}

/// Upstream behaviour shared by every client a [`ScriptedFactory`] hands out.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub links: Vec<String>,
    pub metrics: HashMap<String, Vec<MetricSample>>,
    pub link_failures: HashMap<String, ApiError>,
    pub user_failure: Option<ApiError>,
    pub listing_failure: Option<ApiError>,
    /// Delay of every metrics call; it races the cancellation token.
    pub metrics_delay: Option<Duration>,
}

impl Script {
    pub fn link(mut self, id: &str, samples: &[(&str, u64)]) -> Self {
        self.links.push(id.to_string());
        self.metrics.insert(
            id.to_string(),
            samples
                .iter()
                .map(|(country, clicks)| MetricSample::new(*country, *clicks))
                .collect(),
        );
        self
    }

    pub fn fail_link(mut self, id: &str, error: ApiError) -> Self {
        self.link_failures.insert(id.to_string(), error);
        self
    }
}

/// In-memory upstream API for one request.
pub struct ScriptedApi {
    script: Arc<Script>,
    calls: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<MetricsCall>>>,
}

/// One recorded metrics call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsCall {
    pub link_id: String,
    pub unit: String,
    pub units: i64,
}

impl ScriptedApi {
    pub fn new(script: Arc<Script>, log: Arc<Mutex<Vec<MetricsCall>>>) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            log,
        }
    }

    fn begin(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl LinkMetricsApi for ScriptedApi {
    async fn current_user(&self, cancel: &CancellationToken) -> Result<User, ApiError> {
        self.begin(cancel)?;
        match &self.script.user_failure {
            Some(error) => Err(error.clone()),
            None => Ok(User::in_group(GROUP)),
        }
    }

    async fn list_links(
        &self,
        group_guid: &str,
        size: u32,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<LinkPage, ApiError> {
        self.begin(cancel)?;
        if let Some(error) = &self.script.listing_failure {
            return Err(error.clone());
        }
        if group_guid != GROUP {
            return Err(ApiError::upstream(404, "NOT_FOUND"));
        }

        let size = size as usize;
        let start = (page.saturating_sub(1) as usize) * size;
        let ids: Vec<String> = self
            .script
            .links
            .iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect();
        let next = if start + size < self.script.links.len() {
            format!("https://api.example/groups/{}/bitlinks?page={}", GROUP, page + 1)
        } else {
            String::new()
        };

        Ok(LinkPage::new(ids, next))
    }

    async fn country_metrics(
        &self,
        link_id: &str,
        unit: &str,
        units: i64,
        cancel: &CancellationToken,
    ) -> Result<CountryMetrics, ApiError> {
        self.begin(cancel)?;
        self.log.lock().unwrap().push(MetricsCall {
            link_id: link_id.to_string(),
            unit: unit.to_string(),
            units,
        });

        if let Some(delay) = self.script.metrics_delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if let Some(error) = self.script.link_failures.get(link_id) {
            return Err(error.clone());
        }

        let samples = self
            .script
            .metrics
            .get(link_id)
            .cloned()
            .unwrap_or_default();
        Ok(CountryMetrics::from_samples(samples))
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Hands out one [`ScriptedApi`] per request and keeps track of them.
pub struct ScriptedFactory {
    script: Arc<Script>,
    clients: Mutex<Vec<Weak<ScriptedApi>>>,
    calls: Mutex<Vec<Arc<AtomicUsize>>>,
    log: Arc<Mutex<Vec<MetricsCall>>>,
}

impl ScriptedFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            clients: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Metrics calls made by every client so far, in call order.
    pub fn metrics_calls(&self) -> Vec<MetricsCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    /// Calls made by the client of the most recent request.
    pub fn last_call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Clients some task still holds on to.
    pub fn live_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    /// Waits until every client handed out has been dropped.
    pub async fn wait_until_released(&self, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.live_clients() == 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.live_clients() == 0
    }
}

impl LinkMetricsApiFactory for ScriptedFactory {
    fn connect(&self, _credential: &Credential) -> Arc<dyn LinkMetricsApi> {
        let api = Arc::new(ScriptedApi::new(self.script.clone(), self.log.clone()));
        self.clients.lock().unwrap().push(Arc::downgrade(&api));
        self.calls.lock().unwrap().push(api.calls.clone());
        api
    }
}

pub fn settings(workers: usize, request_timeout: Duration) -> ClicksSettings {
    ClicksSettings {
        pipeline: PipelineConfig::new(workers),
        request_timeout,
    }
}

pub fn create_test_state(factory: Arc<ScriptedFactory>, settings: ClicksSettings) -> AppState {
    let service = ClicksService::new(factory, settings);
    AppState::new(Arc::new(service))
}

pub fn create_test_app(script: Script, settings: ClicksSettings) -> (Router, Arc<ScriptedFactory>) {
    let factory = Arc::new(ScriptedFactory::new(script));
    let state = create_test_state(factory.clone(), settings);
    (router(state), factory)
}
