//! HTTP client for the Bitly v4 API.
//!
//! [`BitlyClientFactory`] owns the shared connection pool and creates one
//! [`BitlyClient`] per incoming request, so each request gets its own call
//! counter.

pub mod client;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::domain::entities::Credential;
use crate::domain::metrics_api::{LinkMetricsApi, LinkMetricsApiFactory};

pub use client::BitlyClient;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-ssl.bitly.com/v4";

/// Builds per-request [`BitlyClient`]s on top of one shared `reqwest` client.
pub struct BitlyClientFactory {
    http: reqwest::Client,
    base_url: Url,
}

impl BitlyClientFactory {
    /// Creates the factory.
    ///
    /// `timeout` bounds each individual upstream call; the request deadline
    /// applies on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute hierarchical URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl LinkMetricsApiFactory for BitlyClientFactory {
    fn connect(&self, credential: &Credential) -> Arc<dyn LinkMetricsApi> {
        Arc::new(BitlyClient::new(
            self.http.clone(),
            self.base_url.clone(),
            credential.clone(),
        ))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid API base URL '{}'", raw))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("API base URL must be an http(s) URL, got '{}'", raw);
    }

    Ok(url)
}
