//! `reqwest`-backed implementation of the link metrics API.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::domain::entities::{CountryMetrics, Credential, LinkPage, User};
use crate::domain::metrics_api::{ApiError, LinkMetricsApi};

/// Client for one request's worth of upstream calls.
///
/// Forwards the caller's credential verbatim and counts every HTTP attempt,
/// successful or not. Clients are cheap to create and share the connection
/// pool of the [`reqwest::Client`] they are built from.
pub struct BitlyClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Credential,
    calls: AtomicUsize,
}

impl BitlyClient {
    /// Creates a client. `base_url` must be a hierarchical URL such as
    /// `https://api-ssl.bitly.com/v4`.
    pub fn new(http: reqwest::Client, base_url: Url, credential: Credential) -> Self {
        Self {
            http,
            base_url,
            credential,
            calls: AtomicUsize::new(0),
        }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    ///
    /// A `/` inside a segment is encoded, so link ids like `bit.ly/2Xyz`
    /// stay a single segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.send(url) => result,
        }
    }

    async fn send<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(call, path = url.path(), "Upstream request");

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.credential.header_value())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LinkMetricsApi for BitlyClient {
    async fn current_user(&self, cancel: &CancellationToken) -> Result<User, ApiError> {
        self.get(self.endpoint(&["user"]), cancel).await
    }

    async fn list_links(
        &self,
        group_guid: &str,
        size: u32,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<LinkPage, ApiError> {
        let mut url = self.endpoint(&["groups", group_guid, "bitlinks"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());

        self.get(url, cancel).await
    }

    async fn country_metrics(
        &self,
        link_id: &str,
        unit: &str,
        units: i64,
        cancel: &CancellationToken,
    ) -> Result<CountryMetrics, ApiError> {
        let mut url = self.endpoint(&["bitlinks", link_id, "countries"]);
        url.query_pairs_mut()
            .append_pair("unit", unit)
            .append_pair("units", &units.to_string());

        self.get(url, cancel).await
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BitlyClient {
        BitlyClient::new(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Credential::parse("Bearer t").unwrap(),
        )
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("https://api-ssl.bitly.com/v4");
        assert_eq!(
            client.endpoint(&["user"]).as_str(),
            "https://api-ssl.bitly.com/v4/user"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let client = client("https://api-ssl.bitly.com/v4/");
        assert_eq!(
            client.endpoint(&["groups", "Ba1", "bitlinks"]).as_str(),
            "https://api-ssl.bitly.com/v4/groups/Ba1/bitlinks"
        );
    }

    #[test]
    fn test_endpoint_escapes_link_id() {
        let client = client("https://api-ssl.bitly.com/v4");
        assert_eq!(
            client
                .endpoint(&["bitlinks", "bit.ly/2Xyz", "countries"])
                .as_str(),
            "https://api-ssl.bitly.com/v4/bitlinks/bit.ly%2F2Xyz/countries"
        );
    }

    #[tokio::test]
    async fn test_cancelled_call_is_not_sent() {
        let client = client("http://127.0.0.1:9");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.current_user(&cancel).await.unwrap_err();

        assert_eq!(err, ApiError::Cancelled);
        assert_eq!(client.call_count(), 0);
    }
}
