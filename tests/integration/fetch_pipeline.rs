//! Captured page through the whole pipeline: fetch, decode, parse, store,
//! and dashboard projection.

use axum::body::Body;
use axum::http::Request;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use tower::ServiceExt;

use wetteronline::conditions::{Condition, MatchOutcome, Resolution};
use wetteronline::dashboard::build_router;
use wetteronline::engine::coordinator::{Coordinator, Location};
use wetteronline::fetch::{decode_entities, WetterOnline, ORIGIN};
use wetteronline::parser::parse_page;
use wetteronline::types::{DayBucket, ScriptValue, StructuralError, WetterError};

use crate::mock_source::{MockSource, CAPTURED_PAGE};

const BERLIN_URL: &str = "https://www.wetteronline.de/wetter/berlin";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap()
}

fn berlin(source: &MockSource) -> WetterOnline {
    WetterOnline::new(Arc::new(source.clone()), ORIGIN, "/wetter/berlin")
}

#[tokio::test]
async fn test_captured_page_end_to_end() {
    let source = MockSource::new().with_page(BERLIN_URL, CAPTURED_PAGE);
    let snapshot = berlin(&source).fetch_at(now()).await.unwrap();
    assert_eq!(source.requests(), [BERLIN_URL]);

    let current = &snapshot.current_observations;
    assert_eq!(current.temperature, 21);
    assert_eq!(current.time_zone, chrono_tz::Europe::Berlin);
    assert_eq!(current.fields["symbolText"], "bewölkt");
    assert_eq!(current.fields["updated"], "11:45");
    assert_eq!(current.condition.as_ref().unwrap().condition, "partlycloudy");

    let stamps: Vec<_> = snapshot
        .hourly_forecast
        .iter()
        .map(|h| h.datetime.to_rfc3339())
        .collect();
    assert_eq!(
        stamps,
        [
            "2024-06-05T22:00:00+02:00",
            "2024-06-05T23:00:00+02:00",
            "2024-06-06T00:00:00+02:00",
            "2024-06-06T01:00:00+02:00",
        ]
    );
    let days: Vec<_> = snapshot.hourly_forecast.iter().map(|h| h.day).collect();
    assert_eq!(
        days,
        [DayBucket::Today, DayBucket::Today, DayBucket::Tomorrow, DayBucket::Tomorrow]
    );

    let first = &snapshot.hourly_forecast[0];
    assert_eq!(first.symbol_text, "bewölkt");
    assert_eq!(first.apparent_temperature, 16.5);
    assert_eq!(first.extra["windDirectionLong"], ScriptValue::Text("Südwest".into()));
    assert_eq!(first.extra["windDirection"], ScriptValue::Text("SW".into()));
    assert_eq!(first.extra["windGustsBft"], ScriptValue::Int(3));
    assert!(!first.extra.contains_key("docrootVersion"));

    let last = &snapshot.hourly_forecast[3];
    assert_eq!(last.temperature, 14.0);
    assert_eq!(last.extra["windGustsBft"], ScriptValue::Null);

    let daily = &snapshot.daily_forecast;
    assert_eq!(daily.len(), 4);
    assert_eq!(daily[0].datetime.to_rfc3339(), "2024-06-05T00:00:00+02:00");
    assert_eq!(daily[3].datetime.to_rfc3339(), "2024-06-08T00:00:00+02:00");
    assert_eq!(
        daily.iter().map(|d| d.max_temperature).collect::<Vec<_>>(),
        [24, 26, 21, 19]
    );
    assert_eq!(daily[3].min_temperature, -1);
    assert_eq!(daily[1].sun_hours, 11);
    assert_eq!(daily[2].precipitation_probability, 75);
}

#[tokio::test]
async fn test_captured_page_conditions() {
    let source = MockSource::new().with_page(BERLIN_URL, CAPTURED_PAGE);
    let snapshot = berlin(&source).fetch_at(now()).await.unwrap();
    let reports: Vec<_> = snapshot.hourly_forecast.iter().map(|h| &h.condition).collect();

    // Both signals agree: no diagnostics.
    assert_eq!(reports[0].condition, "partlycloudy");
    assert_eq!(reports[0].outcome, MatchOutcome::Both);
    assert_eq!(reports[0].condition_custom_symbol, None);

    // Both resolve but disagree: symbol wins, both recorded.
    assert_eq!(reports[1].condition, "rainy");
    assert_eq!(reports[1].condition_custom, "rainy-light-partlycloudy");
    assert_eq!(
        reports[1].condition_custom_symbol,
        Some(Resolution::Resolved(Condition::RainyLightPartlyCloudy))
    );
    assert_eq!(
        reports[1].condition_custom_symboltext,
        Some(Resolution::Resolved(Condition::Rainy))
    );

    assert_eq!(reports[2].condition, "clear-night");
    assert_eq!(reports[2].outcome, MatchOutcome::Both);

    // Unknown symbol code, text resolves after whitespace removal.
    assert_eq!(reports[3].condition, "pouring");
    assert_eq!(reports[3].condition_custom, "pouring-light");
    assert_eq!(reports[3].outcome, MatchOutcome::TextOnly);
    assert_eq!(reports[3].condition_custom_symbol, Some(Resolution::Unresolved));
}

#[tokio::test]
async fn test_snapshot_json_shape() {
    let source = MockSource::new().with_page(BERLIN_URL, CAPTURED_PAGE);
    let snapshot = berlin(&source).fetch_at(now()).await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["current_observations"]["timeZone"], "Europe/Berlin");
    assert_eq!(json["current_observations"]["geoID"], "EDDT");
    let hour = &json["hourly_forecast"][3];
    assert_eq!(hour["daySynonym"], "morgen");
    assert_eq!(hour["symbolText"], "leichter Regen");
    assert_eq!(hour["condition"]["condition_custom_symbol"], "UNKNOWN");
    assert_eq!(hour["condition"]["outcome"], "text_only");
    assert_eq!(json["daily_forecast"][0]["maxTemperature"], 24);
}

#[test]
fn test_parse_is_idempotent() {
    let decoded = decode_entities(CAPTURED_PAGE);
    let first = parse_page(&decoded, now()).unwrap();
    let second = parse_page(&decoded, now()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_hourly_container_is_structural() {
    let page = CAPTURED_PAGE.replace(r#"id="hourly-container""#, r#"id="hourly-teaser""#);
    let source = MockSource::new().with_page(BERLIN_URL, &page);
    match berlin(&source).fetch_at(now()).await {
        Err(WetterError::Structural(StructuralError::MissingNode { selector })) => {
            assert_eq!(selector, "div#hourly-container");
        }
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_day_synonym_is_structural() {
    let page = CAPTURED_PAGE.replacen(r#"daySynonym: "morgen""#, r#"daySynonym: "übermorgen""#, 1);
    let source = MockSource::new().with_page(BERLIN_URL, &page);
    let err = berlin(&source).fetch_at(now()).await.unwrap_err();
    assert!(err.is_structural());
}

#[tokio::test]
async fn test_coordinator_keeps_previous_snapshot_on_failure() {
    let source = MockSource::new().with_page(BERLIN_URL, CAPTURED_PAGE);
    let coordinator = Coordinator::new(vec![Location {
        name: "Berlin".into(),
        path: "wetter/berlin".into(),
        client: berlin(&source),
    }]);

    let report = coordinator.refresh_all().await;
    assert_eq!(report.succeeded, 1);
    let before = coordinator.store().get("Berlin").await.unwrap();
    assert!(before.snapshot.is_some());
    assert!(before.last_error.is_none());

    source.set_status(StatusCode::SERVICE_UNAVAILABLE);
    let report = coordinator.refresh_all().await;
    assert_eq!(report.failed, 1);

    let after = coordinator.store().get("Berlin").await.unwrap();
    assert_eq!(after.snapshot, before.snapshot);
    assert_eq!(after.last_success, before.last_success);
    assert!(after.last_error.unwrap().contains("503"));
    assert_eq!(after.failures, 1);
    assert_eq!(after.refreshes, 2);

    source.clear_status();
    coordinator.refresh_all().await;
    let recovered = coordinator.store().get("Berlin").await.unwrap();
    assert!(recovered.last_error.is_none());
}

#[tokio::test]
async fn test_dashboard_serves_projected_forecast() {
    let source = MockSource::new().with_page(BERLIN_URL, CAPTURED_PAGE);
    let coordinator = Coordinator::new(vec![Location {
        name: "Berlin".into(),
        path: "wetter/berlin".into(),
        client: berlin(&source),
    }]);
    coordinator.refresh_all().await;

    let resp = build_router(coordinator.store())
        .oneshot(
            Request::builder()
                .uri("/api/locations/Berlin/forecast/hourly")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(items.len(), 4);
    assert!(items[0]["datetime"].as_str().unwrap().ends_with(":00:00+00:00"));
    assert_eq!(items[1]["condition"], "rainy");
    assert_eq!(items[1]["symbol"], "bws1__");
    assert_eq!(items[0]["native_apparent_temperature"], 16.5);

    let resp = build_router(coordinator.store())
        .oneshot(
            Request::builder()
                .uri("/api/locations/Berlin/diagnostics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let diagnostics: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(diagnostics["config_entry_data"]["configuration_url"], BERLIN_URL);
    assert_eq!(diagnostics["observation_data"]["current_observations"]["temperature"], 21);
}
