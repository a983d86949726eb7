// src/scheduler.rs
//! Periodic trigger living outside the scan core: a tokio interval that calls
//! `Scanner::run_once` and records each report.

use metrics::gauge;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::history::ScanHistory;
use crate::scan::Scanner;

/// Cadence used when `SCAN_INTERVAL_SECS` is set without a usable value.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub fn spawn_scan_scheduler(
    scanner: Arc<Scanner>,
    history: Arc<ScanHistory>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // A slow scan must not cause a burst of catch-up scans.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let report = scanner.run_once().await;
            gauge!("scan_last_run_ts").set(report.finished_at.timestamp() as f64);
            tracing::info!(
                target: "scan",
                picks = report.picks.len(),
                "scheduled scan tick"
            );
            history.push(&report);
        }
    })
}
