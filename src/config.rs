//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//! Command-line flags (see `main.rs`) are applied on top of it.
//!
//! ```bash
//! export LISTEN="127.0.0.1:8080"
//! export WORKERS="32"
//! export REQUEST_TIMEOUT_SECS="20"
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `WORKERS` - Concurrent metric fetches per request (default: 16, 1..=256)
//! - `REQUEST_TIMEOUT_SECS` - Deadline for a whole request (default: 60)
//! - `API_BASE_URL` - Upstream API root (default: `https://api-ssl.bitly.com/v4`)
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout of a single upstream call (default: 30)
//! - `JOB_QUEUE_CAPACITY` - Bounded job queue size, `0` means `WORKERS` (default: 0)

use anyhow::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::ClicksSettings;
use crate::domain::pipeline::PipelineConfig;
use crate::infrastructure::bitly::DEFAULT_BASE_URL;

const MAX_WORKERS: usize = 256;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub workers: usize,
    pub request_timeout_secs: u64,
    pub api_base_url: String,
    pub upstream_timeout_secs: u64,
    /// `0` sizes the queue to the worker count.
    pub job_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            workers: 16,
            request_timeout_secs: 60,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout_secs: 30,
            job_queue_capacity: 0,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unset or unparsable numeric variables fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            workers: parse_var("WORKERS").unwrap_or(defaults.workers),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
            job_queue_capacity: parse_var("JOB_QUEUE_CAPACITY")
                .unwrap_or(defaults.job_queue_capacity),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `workers` is outside `1..=256`
    /// - either timeout is zero
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - `api_base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            anyhow::bail!(
                "WORKERS must be between 1 and {}, got {}",
                MAX_WORKERS,
                self.workers
            );
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than 0");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!(
                "API_BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.api_base_url
            );
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Service settings derived from this configuration.
    pub fn clicks_settings(&self) -> ClicksSettings {
        let mut pipeline = PipelineConfig::new(self.workers);
        if self.job_queue_capacity > 0 {
            pipeline = pipeline.with_queue_capacity(self.job_queue_capacity);
        }

        ClicksSettings {
            pipeline,
            request_timeout: self.request_timeout(),
        }
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        let settings = self.clicks_settings();

        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Upstream API: {}", self.api_base_url);
        tracing::info!("  Workers: {}", settings.pipeline.workers);
        tracing::info!("  Job queue capacity: {}", settings.pipeline.queue_capacity);
        tracing::info!("  Request timeout: {}s", self.request_timeout_secs);
        tracing::info!("  Upstream timeout: {}s", self.upstream_timeout_secs);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
