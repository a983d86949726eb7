//! # Pick Ranker
//! Pure threshold + stable sort + top-N. No I/O.
//!
//! Ties keep the order in which filings were normalized, so identical inputs
//! always yield an identical pick list.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::analyze::KeywordScore;
use crate::enrich::{Enrichment, PriceContext};
use crate::ingest::types::{Exchange, Filing};

/// A scored filing, owned by the scan that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub filing: Filing,
    /// Keyword score plus any price bonus.
    pub score: f64,
    pub keyword_score: f64,
    pub matched_categories: BTreeSet<String>,
    pub hits: BTreeMap<String, u32>,
    pub enrichment: Enrichment,
}

impl ScoreResult {
    pub fn new(filing: Filing, ks: KeywordScore) -> Self {
        Self {
            filing,
            score: ks.score,
            keyword_score: ks.score,
            matched_categories: ks.categories,
            hits: ks.hits,
            enrichment: Enrichment::Disabled,
        }
    }

    /// Attach an enrichment outcome and its bonus. The keyword score is kept.
    pub fn with_enrichment(mut self, enrichment: Enrichment, bonus: f64) -> Self {
        self.score = self.keyword_score + bonus;
        self.enrichment = enrichment;
        self
    }
}

/// Externally visible pick; everything a table, CSV or chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub symbol: String,
    pub exchange: Exchange,
    pub headline: String,
    pub date: Option<NaiveDateTime>,
    pub score: f64,
    pub keyword_score: f64,
    pub matched_categories: BTreeSet<String>,
    pub hits: BTreeMap<String, u32>,
    pub price_context: Option<PriceContext>,
    pub enrichment: Enrichment,
    pub computed_upside: Option<f64>,
}

impl From<ScoreResult> for Pick {
    fn from(r: ScoreResult) -> Self {
        let computed_upside = match &r.enrichment {
            Enrichment::Available { context } => context.upside_to_peak(),
            _ => None,
        };
        Self {
            symbol: r.filing.symbol,
            exchange: r.filing.source,
            headline: r.filing.headline,
            date: r.filing.date,
            score: r.score,
            keyword_score: r.keyword_score,
            matched_categories: r.matched_categories,
            hits: r.hits,
            price_context: r.enrichment.context(),
            enrichment: r.enrichment,
            computed_upside,
        }
    }
}

/// Keep `score > threshold`, sort by score descending (stable), cap at `max`.
pub fn rank<I>(results: I, threshold: f64, max: Option<usize>) -> Vec<Pick>
where
    I: IntoIterator<Item = ScoreResult>,
{
    let mut kept: Vec<ScoreResult> = results
        .into_iter()
        .filter(|r| r.score > threshold)
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(n) = max {
        kept.truncate(n);
    }
    kept.into_iter().map(Pick::from).collect()
}
