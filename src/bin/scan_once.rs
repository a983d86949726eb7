//! Run a single scan and print the report as JSON.
//! Suited to cron or any external trigger: one invocation, one scan.

use anyhow::Context;
use filings_screener::{config, live_scanner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_default().context("loading screener config")?;
    let scanner = live_scanner(cfg)?;
    let report = scanner.run_once().await;

    for f in &report.diagnostics.failed_sources {
        tracing::warn!(source = %f.source, reason = %f.reason, "source unavailable");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing scan report")?
    );
    Ok(())
}
