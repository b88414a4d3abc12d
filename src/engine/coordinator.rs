//! Refresh coordinator.
//!
//! Fetches every configured location concurrently and records the outcome
//! in a shared store. A failed refresh keeps the previous snapshot and
//! records the error; a partial snapshot is never stored. Retry policy is
//! simply "try again next tick".

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::fetch::WetterOnline;
use crate::types::{WeatherSnapshot, WetterError};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Latest known state of one location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationStatus {
    pub name: String,
    pub path: String,
    pub configuration_url: String,
    pub snapshot: Option<WeatherSnapshot>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub refreshes: u64,
    pub failures: u64,
}

/// Read side shared with the dashboard.
pub struct SnapshotStore {
    locations: RwLock<BTreeMap<String, LocationStatus>>,
}

impl SnapshotStore {
    pub fn new(locations: impl IntoIterator<Item = LocationStatus>) -> Self {
        Self {
            locations: RwLock::new(
                locations
                    .into_iter()
                    .map(|status| (status.name.clone(), status))
                    .collect(),
            ),
        }
    }

    pub async fn get(&self, name: &str) -> Option<LocationStatus> {
        self.locations.read().await.get(name).cloned()
    }

    pub async fn all(&self) -> Vec<LocationStatus> {
        self.locations.read().await.values().cloned().collect()
    }

    pub async fn record_success(&self, name: &str, snapshot: WeatherSnapshot, at: DateTime<Utc>) {
        if let Some(status) = self.locations.write().await.get_mut(name) {
            status.snapshot = Some(snapshot);
            status.last_success = Some(at);
            status.last_attempt = Some(at);
            status.last_error = None;
            status.refreshes += 1;
        }
    }

    pub async fn record_failure(&self, name: &str, err: &WetterError, at: DateTime<Utc>) {
        if let Some(status) = self.locations.write().await.get_mut(name) {
            status.last_attempt = Some(at);
            status.last_error = Some(err.to_string());
            status.refreshes += 1;
            status.failures += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// A configured page.
pub struct Location {
    pub name: String,
    pub path: String,
    pub client: WetterOnline,
}

/// Outcome counts of one refresh round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Coordinator {
    locations: Vec<Location>,
    store: Arc<SnapshotStore>,
}

impl Coordinator {
    pub fn new(locations: Vec<Location>) -> Self {
        let store = SnapshotStore::new(locations.iter().map(|loc| LocationStatus {
            name: loc.name.clone(),
            path: loc.path.clone(),
            configuration_url: loc.client.complete_url().to_string(),
            snapshot: None,
            last_success: None,
            last_attempt: None,
            last_error: None,
            refreshes: 0,
            failures: 0,
        }));
        Self {
            locations,
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    /// Fetch every location once. Locations share nothing but the store.
    pub async fn refresh_all(&self) -> RefreshReport {
        let outcomes = join_all(self.locations.iter().map(|loc| self.refresh(loc))).await;
        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        let report = RefreshReport {
            succeeded,
            failed: outcomes.len() - succeeded,
        };
        info!(succeeded = report.succeeded, failed = report.failed, "Refresh round complete");
        report
    }

    async fn refresh(&self, loc: &Location) -> bool {
        match loc.client.fetch().await {
            Ok(snapshot) => {
                self.store.record_success(&loc.name, snapshot, Utc::now()).await;
                true
            }
            Err(e) => {
                error!(location = %loc.name, error = %e, "Refresh failed");
                self.store.record_failure(&loc.name, &e, Utc::now()).await;
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
