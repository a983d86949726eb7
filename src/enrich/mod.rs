// src/enrich/mod.rs
//! Price-context enrichment: distance of the latest close from the trailing
//! peak, used to reward beaten-down stocks.
//!
//! A failed, empty or timed-out fetch never aborts a scan. The filing keeps
//! its keyword score and carries `Enrichment::Unavailable` with a zeroed
//! context, which stays distinguishable from a real "no fall" reading.

pub mod cache;
pub mod providers;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::EnrichmentConfig;
use crate::enrich::cache::TtlCache;
use crate::enrich::providers::{PricePoint, PriceProvider};
use crate::error::PriceError;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("enrich_fetch_total", "Price history fetches issued.");
        describe_counter!(
            "enrich_unavailable_total",
            "Symbols whose price context could not be computed."
        );
    });
}

/// Price-derived signal for one symbol. All zeros is the sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceContext {
    pub current_price: f64,
    pub peak_price: f64,
    pub trough_price: f64,
    /// `(peak - current) / peak`, clamped to >= 0.
    pub fall_pct: f64,
}

impl PriceContext {
    pub const SENTINEL: PriceContext = PriceContext {
        current_price: 0.0,
        peak_price: 0.0,
        trough_price: 0.0,
        fall_pct: 0.0,
    };

    /// Build from a time-ordered series. `None` when empty or the peak is
    /// not positive.
    pub fn from_series(points: &[PricePoint]) -> Option<Self> {
        let closes: Vec<f64> = points
            .iter()
            .map(|p| p.close)
            .filter(|c| c.is_finite())
            .collect();
        let current = *closes.last()?;
        let peak = closes.iter().copied().fold(f64::MIN, f64::max);
        let trough = closes.iter().copied().fold(f64::MAX, f64::min);
        if peak <= 0.0 {
            return None;
        }
        Some(Self {
            current_price: current,
            peak_price: peak,
            trough_price: trough,
            fall_pct: ((peak - current) / peak).max(0.0),
        })
    }

    /// Recovery needed to get back to the peak, as a fraction of the current
    /// price. Heuristic only.
    pub fn upside_to_peak(&self) -> Option<f64> {
        (self.current_price > 0.0).then(|| (self.peak_price - self.current_price) / self.current_price)
    }
}

/// Why a symbol could not be enriched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    #[error("price fetch failed: {0}")]
    Fetch(String),
    #[error("price fetch timed out")]
    Timeout,
    #[error("no usable price data")]
    NoData,
}

/// Enrichment outcome attached to every scored filing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Enrichment {
    Disabled,
    Available { context: PriceContext },
    Unavailable { reason: UnavailableReason },
}

impl Enrichment {
    /// The context to show downstream: real, sentinel, or none when disabled.
    pub fn context(&self) -> Option<PriceContext> {
        match self {
            Enrichment::Disabled => None,
            Enrichment::Available { context } => Some(*context),
            Enrichment::Unavailable { .. } => Some(PriceContext::SENTINEL),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Enrichment::Unavailable { .. })
    }
}

/// Fetches, caches and scores price context per symbol.
pub struct Enricher {
    provider: Arc<dyn PriceProvider>,
    cache: TtlCache<String, PriceContext, UnavailableReason>,
    cfg: EnrichmentConfig,
    timeout: Duration,
}

impl Enricher {
    pub fn new(provider: Arc<dyn PriceProvider>, cfg: EnrichmentConfig, timeout: Duration) -> Self {
        ensure_metrics_described();
        Self {
            provider,
            cache: TtlCache::new(cfg.ttl()),
            cfg,
            timeout,
        }
    }

    pub fn cache(&self) -> &TtlCache<String, PriceContext, UnavailableReason> {
        &self.cache
    }

    /// Price context for `symbol`, served from cache within the TTL.
    pub async fn enrich(&self, symbol: &str) -> Enrichment {
        let key = symbol.to_string();
        let res = self
            .cache
            .get_or_try_compute(&key, || self.fetch_context(symbol))
            .await;
        match res {
            Ok(context) => Enrichment::Available { context },
            Err(reason) => {
                counter!("enrich_unavailable_total").increment(1);
                tracing::warn!(target: "enrich", symbol, %reason, "enrichment unavailable");
                Enrichment::Unavailable { reason }
            }
        }
    }

    /// Enrich distinct symbols with at most `concurrency` fetches in flight.
    pub async fn enrich_all<I, S>(self: &Arc<Self>, symbols: I) -> HashMap<String, Enrichment>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // one pass per scan keeps the cache bounded by recently seen symbols
        self.cache.purge_expired();
        let distinct: BTreeSet<String> = symbols.into_iter().map(Into::into).collect();
        let sem = Arc::new(Semaphore::new(self.cfg.concurrency.max(1)));
        let mut set = JoinSet::new();
        for symbol in distinct {
            let this = Arc::clone(self);
            let sem = Arc::clone(&sem);
            set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let e = this.enrich(&symbol).await;
                (symbol, e)
            });
        }

        let mut out = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((symbol, e)) => {
                    out.insert(symbol, e);
                }
                Err(e) => tracing::warn!(target: "enrich", error = ?e, "enrichment task failed"),
            }
        }
        out
    }

    /// Score bonus earned by an enrichment outcome.
    pub fn bonus_for(&self, e: &Enrichment) -> f64 {
        match e {
            Enrichment::Available { context } if context.fall_pct > self.cfg.fall_threshold => {
                self.cfg.bonus
            }
            _ => 0.0,
        }
    }

    /// Raw series for charting, with the same per-call timeout. Not cached.
    pub async fn series(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, UnavailableReason> {
        match tokio::time::timeout(self.timeout, self.provider.history(symbol, days)).await {
            Ok(Ok(v)) if !v.is_empty() => Ok(v),
            Ok(Ok(_)) | Ok(Err(PriceError::NoData(_))) => Err(UnavailableReason::NoData),
            Ok(Err(e)) => Err(UnavailableReason::Fetch(e.to_string())),
            Err(_) => Err(UnavailableReason::Timeout),
        }
    }

    async fn fetch_context(&self, symbol: &str) -> Result<PriceContext, UnavailableReason> {
        counter!("enrich_fetch_total").increment(1);
        let points = self.series(symbol, self.cfg.lookback_days).await?;
        let ctx = PriceContext::from_series(&points).ok_or(UnavailableReason::NoData)?;
        tracing::debug!(target: "enrich", symbol, fall_pct = ctx.fall_pct, "price context");
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::providers::StaticPrices;

    fn pts(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                ts: i as i64,
                close: *c,
            })
            .collect()
    }

    #[test]
    fn fall_from_peak() {
        let c = PriceContext::from_series(&pts(&[100.0, 200.0, 120.0])).unwrap();
        assert_eq!(c.peak_price, 200.0);
        assert_eq!(c.trough_price, 100.0);
        assert_eq!(c.current_price, 120.0);
        assert!((c.fall_pct - 0.4).abs() < 1e-12);
        assert!((c.upside_to_peak().unwrap() - (80.0 / 120.0)).abs() < 1e-12);
    }

    #[test]
    fn at_peak_is_zero_fall() {
        let c = PriceContext::from_series(&pts(&[10.0, 20.0])).unwrap();
        assert_eq!(c.fall_pct, 0.0);
    }

    #[test]
    fn empty_or_worthless_series_has_no_context() {
        assert!(PriceContext::from_series(&[]).is_none());
        assert!(PriceContext::from_series(&pts(&[0.0, 0.0])).is_none());
    }

    #[tokio::test]
    async fn bonus_only_above_threshold() {
        let prices = StaticPrices::new()
            .with_closes("DOWN.NS", &[100.0, 60.0])
            .with_closes("FLAT.NS", &[100.0, 80.0]);
        let e = Enricher::new(
            Arc::new(prices),
            EnrichmentConfig::default(),
            Duration::from_secs(1),
        );
        let down = e.enrich("DOWN.NS").await;
        let flat = e.enrich("FLAT.NS").await;
        let missing = e.enrich("NOPE.NS").await;
        assert_eq!(e.bonus_for(&down), 3.0);
        assert_eq!(e.bonus_for(&flat), 0.0);
        assert_eq!(e.bonus_for(&missing), 0.0);
        assert_eq!(
            missing,
            Enrichment::Unavailable {
                reason: UnavailableReason::NoData
            }
        );
        assert_eq!(missing.context(), Some(PriceContext::SENTINEL));
        assert_eq!(Enrichment::Disabled.context(), None);
    }
}
