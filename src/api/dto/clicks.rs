//! DTOs for the country clicks endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};

use crate::application::services::{ClicksQuery, ClicksReport};
use crate::domain::entities::MetricsWindow;

/// Largest link page the endpoint will request upstream.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters of `GET /v1/clicks/country`.
///
/// Non-numeric values are treated as absent and fall back to their defaults.
/// `size` and `page` are read as signed integers so that negative or
/// oversized values are rejected by validation instead.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct CountryClicksParams {
    #[serde(default)]
    pub unit: Option<String>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub units: Option<i64>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub size: Option<i64>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub page: Option<i64>,
}

impl CountryClicksParams {
    /// Applies defaults and validates the link window.
    ///
    /// # Defaults
    ///
    /// - `unit`: `day`
    /// - `units`: 30
    /// - `size`: 10
    /// - `page`: 1
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Size must be between 1 and [`MAX_PAGE_SIZE`]
    pub fn validate_and_into_query(self) -> Result<ClicksQuery, String> {
        let defaults = ClicksQuery::default();

        let unit = self
            .unit
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(defaults.window.unit);
        let units = self.units.unwrap_or(defaults.window.units);
        let page = self.page.unwrap_or(i64::from(defaults.page));
        let page_size = self.size.unwrap_or(i64::from(defaults.page_size));

        if page < 1 {
            return Err("Page must be greater than 0".to_string());
        }
        let page = u32::try_from(page).map_err(|_| format!("Page must be at most {}", u32::MAX))?;

        let page_size = u32::try_from(page_size)
            .ok()
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .ok_or_else(|| format!("Size must be between 1 and {}", MAX_PAGE_SIZE))?;

        Ok(ClicksQuery {
            window: MetricsWindow::new(unit, units),
            page_size,
            page,
        })
    }
}

/// Average clicks per link from one country.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryAverageItem {
    pub average: f32,
    pub country: String,
}

/// Response body of `GET /v1/clicks/country`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryClicksResponse {
    /// Number of links in the group.
    pub total: usize,
    /// Upstream API calls made to answer this request.
    pub api_calls: usize,
    /// Sorted by country.
    pub results: Vec<CountryAverageItem>,
}

impl From<ClicksReport> for CountryClicksResponse {
    fn from(report: ClicksReport) -> Self {
        Self {
            total: report.total,
            api_calls: report.api_calls,
            results: report
                .averages
                .into_iter()
                .map(|a| CountryAverageItem {
                    average: a.average,
                    country: a.country,
                })
                .collect(),
        }
    }
}
