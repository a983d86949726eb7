// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod history;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod scan;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::ScreenerConfig;
pub use crate::error::ConfigError;
pub use crate::rank::Pick;
pub use crate::scan::{ScanReport, Scanner};

use anyhow::Context;
use std::sync::Arc;

use crate::enrich::providers::yahoo::YahooChartProvider;
use crate::ingest::providers::{bse::BseFeed, http_client, nse::NseFeed};
use crate::ingest::types::FilingFeed;

/// Assemble a scanner wired to the live BSE/NSE feeds and Yahoo prices.
///
/// Configuration errors surface here, before any request is made.
pub fn live_scanner(cfg: ScreenerConfig) -> anyhow::Result<Scanner> {
    cfg.validate().context("invalid screener config")?;

    let client = http_client(cfg.fetch_timeout())?;
    let feeds: Vec<Box<dyn FilingFeed>> = vec![
        Box::new(BseFeed::http(client.clone(), cfg.days_back)),
        Box::new(NseFeed::http(client, cfg.days_back)),
    ];
    let prices = YahooChartProvider::new(cfg.fetch_timeout()).context("building price client")?;

    Scanner::new(cfg, feeds, Arc::new(prices)).context("invalid screener config")
}
