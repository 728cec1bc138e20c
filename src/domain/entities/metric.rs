//! Country click metrics for a single link.

use serde::Deserialize;

/// Clicks attributed to one country.
///
/// The upstream API names the facet value `value`; for the countries facet
/// it holds the country code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetricSample {
    #[serde(rename = "value")]
    pub country: String,
    pub clicks: u64,
}

impl MetricSample {
    pub fn new(country: impl Into<String>, clicks: u64) -> Self {
        Self {
            country: country.into(),
            clicks,
        }
    }
}

/// Metrics breakdown returned for one link.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountryMetrics {
    pub facet: String,
    pub unit: String,
    pub units: i64,
    pub unit_reference: String,
    pub metrics: Vec<MetricSample>,
}

impl CountryMetrics {
    /// Builds a countries breakdown from samples.
    pub fn from_samples(samples: Vec<MetricSample>) -> Self {
        Self {
            facet: "countries".to_string(),
            metrics: samples,
            ..Self::default()
        }
    }
}

/// The reporting window for metric queries: bucket granularity and bucket count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsWindow {
    pub unit: String,
    pub units: i64,
}

impl MetricsWindow {
    pub fn new(unit: impl Into<String>, units: i64) -> Self {
        Self {
            unit: unit.into(),
            units,
        }
    }
}

impl Default for MetricsWindow {
    fn default() -> Self {
        Self::new("day", 30)
    }
}
