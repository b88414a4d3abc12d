//! `reqwest`-backed page source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::debug;

use super::PageSource;
use crate::types::TransportError;

/// The site serves reduced pages to non-browser user agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

/// HTTP transport. Redirects are never followed: a moved page or an
/// invalid slug must surface as an error, not as a different page.
pub struct HttpPageSource {
    http: Client,
    timeout: Duration,
}

impl HttpPageSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        // gzip(true) also sends `Accept-Encoding: gzip`.
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to build WetterOnline HTTP client")?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get_page(&self, url: &str) -> Result<String, TransportError> {
        let resp = self.http.get(url).send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();
        debug!(url, %status, "Page response");

        if status.is_redirection() {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(TransportError::Redirected { status, location });
        }
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        resp.text().await.map_err(|e| self.classify(e))
    }
}

impl HttpPageSource {
    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Http(err)
        }
    }
}
