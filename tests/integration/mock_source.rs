//! Mock page source for integration testing.
//!
//! Serves captured pages from memory, records every requested URL and can
//! be switched into a failing mode, all without touching the network.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wetteronline::fetch::PageSource;
use wetteronline::types::TransportError;

/// The captured WetterOnline page used throughout the integration tests.
pub const CAPTURED_PAGE: &str = include_str!("../fixtures/wetteronline_page.html");

/// In-memory page source keyed by complete URL. Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct MockSource {
    pages: Arc<Mutex<HashMap<String, String>>>,
    requests: Arc<Mutex<Vec<String>>>,
    /// If set, every request fails with this status.
    force_status: Arc<Mutex<Option<StatusCode>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), body.to_string());
        self
    }

    pub fn set_status(&self, status: StatusCode) {
        *self.force_status.lock().unwrap() = Some(status);
    }

    pub fn clear_status(&self) {
        *self.force_status.lock().unwrap() = None;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn get_page(&self, url: &str) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(status) = *self.force_status.lock().unwrap() {
            return Err(TransportError::Status(status));
        }
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(TransportError::Status(StatusCode::NOT_FOUND))
    }
}
