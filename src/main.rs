//! Filings Screener: Binary Entrypoint
//! Boots the Axum HTTP server with a live scanner, and optionally a periodic
//! scan trigger (`SCAN_INTERVAL_SECS`).

use anyhow::Context;
use filings_screener::{api, config, live_scanner, metrics::Metrics, scheduler};
use shuttle_axum::ShuttleAxum;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_SCAN_INTERVAL_SECS: &str = "SCAN_INTERVAL_SECS";

/// Compact local logs. Opt-in with `SCREENER_DEV_LOG=1`; the hosting runtime
/// otherwise owns the subscriber.
fn enable_dev_tracing() {
    let dev_flag = std::env::var("SCREENER_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");
    if !dev_flag {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=info,enrich=info,scan=info,api=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = config::load_default().context("loading screener config")?;
    let ttl_secs = cfg.enrichment.ttl_secs;
    let scanner = live_scanner(cfg)?;
    let state = api::AppState::new(scanner);

    // Unset disables the trigger; "0" or an unparseable value means the default cadence.
    if let Ok(raw) = std::env::var(ENV_SCAN_INTERVAL_SECS) {
        let every = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(scheduler::DEFAULT_INTERVAL);
        tracing::info!(target: "scan", every_secs = every.as_secs(), "periodic scans enabled");
        scheduler::spawn_scan_scheduler(state.scanner.clone(), state.history.clone(), every);
    }

    let mut router = api::router(state);
    match Metrics::init(ttl_secs) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
