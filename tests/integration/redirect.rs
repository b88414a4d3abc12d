//! Real `reqwest` transport against a local axum server.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use wetteronline::fetch::http::{HttpPageSource, BROWSER_USER_AGENT};
use wetteronline::fetch::{PageSource, WetterOnline};
use wetteronline::types::{TransportError, WetterError};

use crate::mock_source::CAPTURED_PAGE;

async fn moved() -> impl IntoResponse {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, "https://www.wetteronline.de/")],
    )
}

async fn page() -> &'static str {
    CAPTURED_PAGE
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/wetter/atlantis", get(moved))
        .route("/wetter/berlin", get(page))
        .route("/wetter/gone", get(|| async { StatusCode::GONE }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn http_source() -> Arc<HttpPageSource> {
    Arc::new(HttpPageSource::new(BROWSER_USER_AGENT, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let addr = serve().await;
    let err = http_source()
        .get_page(&format!("http://{addr}/wetter/atlantis"))
        .await
        .unwrap_err();
    match err {
        TransportError::Redirected { status, location } => {
            assert_eq!(status, reqwest::StatusCode::MOVED_PERMANENTLY);
            assert_eq!(location.as_deref(), Some("https://www.wetteronline.de/"));
        }
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redirect_fails_the_fetch() {
    let addr = serve().await;
    let wo = WetterOnline::new(http_source(), &format!("http://{addr}"), "/wetter/atlantis");
    match wo.fetch().await {
        Err(WetterError::Transport { url, source }) => {
            assert_eq!(url, format!("http://{addr}/wetter/atlantis"));
            assert!(matches!(source, TransportError::Redirected { .. }));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_is_transport() {
    let addr = serve().await;
    let err = http_source()
        .get_page(&format!("http://{addr}/wetter/gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status(s) if s == reqwest::StatusCode::GONE));
}

#[tokio::test]
async fn test_real_transport_end_to_end() {
    let addr = serve().await;
    let wo = WetterOnline::new(http_source(), &format!("http://{addr}"), "wetter/berlin");
    let snapshot = wo.fetch().await.unwrap();
    assert_eq!(snapshot.current_observations.temperature, 21);
    assert_eq!(snapshot.hourly_forecast.len(), 4);
    assert_eq!(snapshot.daily_forecast.len(), 4);
}
