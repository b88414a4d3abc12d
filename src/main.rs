//! WetterOnline scraper daemon.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and refreshes every configured location on a fixed interval while the
//! dashboard serves the latest snapshots. `--once` fetches each location
//! a single time, prints the snapshots as JSON and exits.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use wetteronline::config::{self, AppConfig};
use wetteronline::dashboard;
use wetteronline::engine::coordinator::{Coordinator, Location};
use wetteronline::fetch::http::HttpPageSource;
use wetteronline::fetch::{PageSource, WetterOnline};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_default()?;
    init_logging();

    let once = std::env::args().skip(1).any(|arg| arg == "--once");
    info!(
        locations = cfg.locations.len(),
        interval_secs = cfg.poller.interval_secs,
        origin = %cfg.source.origin,
        once,
        "WetterOnline scraper starting up"
    );

    let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::new(
        &cfg.source.user_agent,
        cfg.source.timeout(),
    )?);

    if once {
        return fetch_once(&cfg, source).await;
    }

    let coordinator = Coordinator::new(build_locations(&cfg, &source));

    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(coordinator.store(), cfg.dashboard.port).await?;
    }

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.poller.interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.poller.interval_secs,
        "Entering refresh loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                coordinator.refresh_all().await;
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("WetterOnline scraper shut down cleanly.");
    Ok(())
}

fn build_locations(cfg: &AppConfig, source: &Arc<dyn PageSource>) -> Vec<Location> {
    cfg.locations
        .iter()
        .map(|loc| Location {
            name: loc.name.clone(),
            path: loc.path.clone(),
            client: WetterOnline::new(Arc::clone(source), &cfg.source.origin, &loc.path)
                .with_timeout(cfg.source.timeout()),
        })
        .collect()
}

/// Fetch every location once and print `{name: snapshot}` to stdout.
/// Fails if any location fails.
async fn fetch_once(cfg: &AppConfig, source: Arc<dyn PageSource>) -> Result<()> {
    let mut snapshots = BTreeMap::new();
    let mut failed = 0usize;
    for loc in build_locations(cfg, &source) {
        match loc.client.fetch().await {
            Ok(snapshot) => {
                snapshots.insert(loc.name, snapshot);
            }
            Err(e) => {
                error!(location = %loc.name, error = %e, "Fetch failed");
                failed += 1;
            }
        }
    }

    let json = serde_json::to_string_pretty(&snapshots).context("Failed to serialize snapshots")?;
    println!("{json}");

    if failed > 0 {
        anyhow::bail!("{failed} of {} locations failed", cfg.locations.len());
    }
    Ok(())
}

/// Initialise tracing on stderr, keeping stdout for `--once` output.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wetteronline=info"));

    if std::env::var(config::LOG_JSON_ENV).is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
