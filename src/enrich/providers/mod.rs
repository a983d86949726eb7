// src/enrich/providers/mod.rs
pub mod yahoo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::PriceError;

/// One daily close. `ts` is unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: i64,
    pub close: f64,
}

/// Market-data provider: time-ordered daily closes for a symbol.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn history(&self, symbol: &str, lookback_days: u32)
        -> Result<Vec<PricePoint>, PriceError>;
    fn name(&self) -> &'static str;
}

/// Canned series keyed by symbol; unknown symbols yield `NoData`.
#[derive(Debug, Clone, Default)]
pub struct StaticPrices {
    series: HashMap<String, Vec<PricePoint>>,
}

impl StaticPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register daily closes for `symbol` (`ts = index * 86400`).
    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        let pts = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                ts: i as i64 * 86_400,
                close: *c,
            })
            .collect();
        self.series.insert(symbol.to_string(), pts);
        self
    }
}

#[async_trait]
impl PriceProvider for StaticPrices {
    async fn history(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<Vec<PricePoint>, PriceError> {
        match self.series.get(symbol) {
            Some(v) if !v.is_empty() => Ok(v.clone()),
            _ => Err(PriceError::NoData(symbol.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
