//! Fetch orchestrator.
//!
//! One outbound GET per call, then entity decoding and a synchronous parse.
//! The transport is injected through [`PageSource`] so the orchestrator
//! can be driven from captured pages in tests.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::parser::parse_page;
use crate::types::{TransportError, WeatherSnapshot, WetterError};

/// Every page lives under this origin.
pub const ORIGIN: &str = "https://www.wetteronline.de";

/// Upper bound on the network wait for one fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport able to GET a page without following redirects.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Return the raw response body of a successful (2xx) response.
    async fn get_page(&self, url: &str) -> Result<String, TransportError>;
}

/// Fetches and parses one configured page.
pub struct WetterOnline {
    source: Arc<dyn PageSource>,
    complete_url: String,
    timeout: Duration,
}

impl WetterOnline {
    /// `path` is the page slug, e.g. `wetter/berlin`. Leading slashes are ignored.
    pub fn new(source: Arc<dyn PageSource>, origin: &str, path: &str) -> Self {
        let complete_url = format!(
            "{}/{}",
            origin.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Self {
            source,
            complete_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn complete_url(&self) -> &str {
        &self.complete_url
    }

    /// Fetch now.
    pub async fn fetch(&self) -> Result<WeatherSnapshot, WetterError> {
        self.fetch_at(Utc::now()).await
    }

    /// Fetch, resolving "today" and the current year from `now`.
    pub async fn fetch_at(&self, now: DateTime<Utc>) -> Result<WeatherSnapshot, WetterError> {
        debug!(url = %self.complete_url, "Fetching page");

        let body = match tokio::time::timeout(self.timeout, self.source.get_page(&self.complete_url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(source)) => return Err(self.transport_error(source)),
            Err(_) => return Err(self.transport_error(TransportError::Timeout(self.timeout))),
        };

        let decoded = decode_entities(&body);
        let snapshot = parse_page(&decoded, now)?;

        info!(
            url = %self.complete_url,
            temperature = snapshot.current_observations.temperature,
            hourly = snapshot.hourly_forecast.len(),
            daily = snapshot.daily_forecast.len(),
            "Weather fetched"
        );
        Ok(snapshot)
    }

    fn transport_error(&self, source: TransportError) -> WetterError {
        WetterError::Transport {
            url: self.complete_url.clone(),
            source,
        }
    }
}

/// Decode named and numeric entities across the whole body, including
/// inside script blocks where the HTML parser would leave them untouched.
pub fn decode_entities(body: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
