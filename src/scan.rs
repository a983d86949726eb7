//! # Scan
//! One explicit scan invocation: fetch → normalize → score → enrich → rank.
//!
//! A `Scanner` owns its configuration, feeds and the enrichment cache. It is
//! built once (configuration is validated there, before any network call)
//! and `run_once` can then be invoked by whatever trigger the caller uses.
//! The scanner itself never sleeps or polls.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::analyze::{score_text, RuleSet};
use crate::config::ScreenerConfig;
use crate::enrich::providers::{PricePoint, PriceProvider};
use crate::enrich::{Enricher, Enrichment, UnavailableReason};
use crate::error::ConfigError;
use crate::ingest::types::{Filing, FilingFeed};
use crate::ingest::{self, SourceFailure};
use crate::rank::{rank, Pick, ScoreResult};

/// Counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanDiagnostics {
    pub records_read: usize,
    pub records_usable: usize,
    pub records_dropped: usize,
    pub failed_sources: Vec<SourceFailure>,
    /// Symbols whose price context could not be fetched.
    pub enrichment_unavailable: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub picks: Vec<Pick>,
    pub diagnostics: ScanDiagnostics,
}

pub struct Scanner {
    cfg: ScreenerConfig,
    rules: RuleSet,
    feeds: Vec<Box<dyn FilingFeed>>,
    enricher: Arc<Enricher>,
}

impl Scanner {
    /// Validate `cfg` and assemble a scanner. Fails only on configuration.
    pub fn new(
        cfg: ScreenerConfig,
        feeds: Vec<Box<dyn FilingFeed>>,
        prices: Arc<dyn PriceProvider>,
    ) -> Result<Self, ConfigError> {
        let rules = cfg.validate()?;
        let enricher = Arc::new(Enricher::new(
            prices,
            cfg.enrichment.clone(),
            cfg.fetch_timeout(),
        ));
        Ok(Self {
            cfg,
            rules,
            feeds,
            enricher,
        })
    }

    /// Keyword-score filings, preserving order. Pure.
    pub fn score_filings(&self, filings: Vec<Filing>) -> Vec<ScoreResult> {
        filings
            .into_iter()
            .map(|f| {
                let ks = score_text(&f.text, &self.rules, self.cfg.keyword_weight);
                ScoreResult::new(f, ks)
            })
            .collect()
    }

    /// Attach price context and bonuses. Returns the symbols that could not
    /// be enriched.
    pub async fn enrich_results(
        &self,
        results: Vec<ScoreResult>,
    ) -> (Vec<ScoreResult>, BTreeSet<String>) {
        if !self.cfg.enrichment.enabled {
            return (results, BTreeSet::new());
        }

        let by_symbol = self
            .enricher
            .enrich_all(results.iter().map(|r| r.filing.symbol.clone()))
            .await;

        let mut unavailable = BTreeSet::new();
        let out = results
            .into_iter()
            .map(|r| {
                let e = by_symbol
                    .get(&r.filing.symbol)
                    .cloned()
                    .unwrap_or_else(|| Enrichment::Unavailable {
                        reason: UnavailableReason::Fetch("enrichment task failed".into()),
                    });
                if e.is_unavailable() {
                    unavailable.insert(r.filing.symbol.clone());
                }
                let bonus = self.enricher.bonus_for(&e);
                r.with_enrichment(e, bonus)
            })
            .collect();
        (out, unavailable)
    }

    /// Run one full scan.
    pub async fn run_once(&self) -> ScanReport {
        let started_at = Utc::now();
        let t0 = std::time::Instant::now();

        let (batches, failed_sources) = ingest::fetch_all(&self.feeds, self.cfg.fetch_timeout()).await;
        let (filings, records_read, records_dropped) =
            ingest::normalize_all(&batches, &self.cfg.markets);
        let records_usable = filings.len();

        let scored = self.score_filings(filings);
        let (scored, enrichment_unavailable) = self.enrich_results(scored).await;
        let picks = rank(scored, self.cfg.threshold, self.cfg.max_picks);

        counter!("scan_runs_total").increment(1);
        counter!("scan_picks_total").increment(picks.len() as u64);
        histogram!("scan_duration_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        tracing::info!(
            target: "scan",
            read = records_read,
            usable = records_usable,
            dropped = records_dropped,
            failed_sources = failed_sources.len(),
            enrichment_unavailable = enrichment_unavailable.len(),
            picks = picks.len(),
            "scan finished"
        );

        ScanReport {
            started_at,
            finished_at: Utc::now(),
            picks,
            diagnostics: ScanDiagnostics {
                records_read,
                records_usable,
                records_dropped,
                failed_sources,
                enrichment_unavailable,
            },
        }
    }

    /// Daily closes for charting a pick (the usual view is ~90 days).
    pub async fn price_series(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, UnavailableReason> {
        self.enricher.series(symbol, days).await
    }
}
