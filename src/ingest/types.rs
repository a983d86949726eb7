// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A raw announcement record as the exchange returns it (arbitrary keys).
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Bse,
    Nse,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Bse => "BSE",
            Exchange::Nse => "NSE",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized corporate filing, as produced by `ingest::normalize_record`.
/// The pipeline never mutates a filing once built; fields stay public so
/// callers and tests can construct one directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub symbol: String,   // canonical ticker, e.g. "RELIANCE.NS"
    pub headline: String, // subject line, for display
    pub text: String,     // subject + " " + summary
    pub date: Option<NaiveDateTime>,
    pub source: Exchange,
}

/// A feed of raw announcement records from one exchange.
#[async_trait::async_trait]
pub trait FilingFeed: Send + Sync {
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>>;
    fn exchange(&self) -> Exchange;
    fn name(&self) -> &'static str;
}
