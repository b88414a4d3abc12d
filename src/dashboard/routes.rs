//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is the coordinator's `Arc<SnapshotStore>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::engine::coordinator::{LocationStatus, SnapshotStore};
use crate::types::{DailyEntry, HourlyEntry, WeatherSnapshot};

pub type AppState = Arc<SnapshotStore>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One row of the location overview.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub name: String,
    pub configuration_url: String,
    pub temperature: Option<i32>,
    pub condition: Option<String>,
    pub last_success: Option<String>,
    pub last_error: Option<String>,
    pub refreshes: u64,
    pub failures: u64,
}

impl From<&LocationStatus> for LocationSummary {
    fn from(status: &LocationStatus) -> Self {
        let current = status.snapshot.as_ref().map(|s| &s.current_observations);
        Self {
            name: status.name.clone(),
            configuration_url: status.configuration_url.clone(),
            temperature: current.map(|c| c.temperature),
            condition: current
                .and_then(|c| c.condition.as_ref())
                .map(|report| report.condition.clone()),
            last_success: status.last_success.map(|t| t.to_rfc3339()),
            last_error: status.last_error.clone(),
            refreshes: status.refreshes,
            failures: status.failures,
        }
    }
}

/// Consumer-facing forecast row. Timestamps are UTC, fields that do not
/// apply to a daily or hourly row are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastItem {
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub native_temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_templow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_apparent_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "symbolText", skip_serializing_if = "Option::is_none")]
    pub symbol_text: Option<String>,
}

impl From<&DailyEntry> for ForecastItem {
    fn from(day: &DailyEntry) -> Self {
        Self {
            datetime: utc_iso(day.datetime),
            condition: None,
            native_temperature: f64::from(day.max_temperature),
            native_templow: Some(f64::from(day.min_temperature)),
            native_apparent_temperature: None,
            humidity: None,
            precipitation_probability: Some(day.precipitation_probability),
            symbol: None,
            symbol_text: None,
        }
    }
}

impl From<&HourlyEntry> for ForecastItem {
    fn from(hour: &HourlyEntry) -> Self {
        Self {
            datetime: utc_iso(hour.datetime),
            condition: Some(hour.condition.condition.clone()),
            native_temperature: hour.temperature,
            native_templow: None,
            native_apparent_temperature: Some(hour.apparent_temperature),
            humidity: Some(hour.humidity),
            precipitation_probability: None,
            symbol: Some(hour.symbol.clone()),
            symbol_text: Some(hour.symbol_text.clone()),
        }
    }
}

fn utc_iso<Tz: chrono::TimeZone>(at: chrono::DateTime<Tz>) -> String {
    at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntryData {
    pub name: String,
    pub path: String,
    pub configuration_url: String,
}

/// Full state dump of one location.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsResponse {
    pub config_entry_data: ConfigEntryData,
    pub observation_data: Option<WeatherSnapshot>,
    pub last_success: Option<String>,
    pub last_attempt: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/locations
pub async fn get_locations(State(store): State<AppState>) -> Json<Vec<LocationSummary>> {
    let all = store.all().await;
    Json(all.iter().map(LocationSummary::from).collect())
}

/// GET /api/locations/:name
pub async fn get_location(
    State(store): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<LocationStatus> {
    lookup(&store, &name).await.map(Json)
}

/// GET /api/locations/:name/forecast/daily
pub async fn get_daily_forecast(
    State(store): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<ForecastItem>> {
    let snapshot = latest_snapshot(&store, &name).await?;
    Ok(Json(snapshot.daily_forecast.iter().map(ForecastItem::from).collect()))
}

/// GET /api/locations/:name/forecast/hourly
pub async fn get_hourly_forecast(
    State(store): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<ForecastItem>> {
    let snapshot = latest_snapshot(&store, &name).await?;
    Ok(Json(snapshot.hourly_forecast.iter().map(ForecastItem::from).collect()))
}

/// GET /api/locations/:name/diagnostics
pub async fn get_diagnostics(
    State(store): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<DiagnosticsResponse> {
    let status = lookup(&store, &name).await?;
    Ok(Json(DiagnosticsResponse {
        config_entry_data: ConfigEntryData {
            name: status.name,
            path: status.path,
            configuration_url: status.configuration_url,
        },
        observation_data: status.snapshot,
        last_success: status.last_success.map(|t| t.to_rfc3339()),
        last_attempt: status.last_attempt.map(|t| t.to_rfc3339()),
        last_error: status.last_error,
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

async fn lookup(
    store: &SnapshotStore,
    name: &str,
) -> Result<LocationStatus, (StatusCode, Json<ErrorResponse>)> {
    store.get(name).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown location: {name}"),
            }),
        )
    })
}

/// 503 until the first successful refresh.
async fn latest_snapshot(
    store: &SnapshotStore,
    name: &str,
) -> Result<WeatherSnapshot, (StatusCode, Json<ErrorResponse>)> {
    let status = lookup(store, name).await?;
    status.snapshot.ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: status
                    .last_error
                    .unwrap_or_else(|| format!("no data yet for {name}")),
            }),
        )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
