// src/enrich/providers/yahoo.rs
//! Daily closes from the Yahoo Finance v8 chart endpoint.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{PricePoint, PriceProvider};
use crate::error::PriceError;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::ingest::providers::USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at another host (mirrors, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self, symbol: &str, lookback_days: u32) -> Result<Url, PriceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| PriceError::Decode(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PriceError::Decode(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        let now = chrono::Utc::now().timestamp();
        let from = now - i64::from(lookback_days) * 86_400;
        url.query_pairs_mut()
            .append_pair("period1", &from.to_string())
            .append_pair("period2", &now.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart payload into time-ordered closes; null closes are skipped.
pub(crate) fn parse_chart(symbol: &str, body: &str) -> Result<Vec<PricePoint>, PriceError> {
    let env: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| PriceError::Decode(e.to_string()))?;

    if let Some(err) = env.chart.error {
        tracing::debug!(target: "enrich", symbol, error = ?err.description, "chart error");
        return Err(PriceError::NoData(symbol.to_string()));
    }

    let result = env
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| PriceError::NoData(symbol.to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut out: Vec<PricePoint> = result
        .timestamp
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, c)| c.filter(|c| c.is_finite()).map(|close| PricePoint { ts, close }))
        .collect();
    out.sort_by_key(|p| p.ts);

    if out.is_empty() {
        return Err(PriceError::NoData(symbol.to_string()));
    }
    Ok(out)
}

#[async_trait]
impl PriceProvider for YahooChartProvider {
    async fn history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PricePoint>, PriceError> {
        let url = self.chart_url(symbol, lookback_days)?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceError::NoData(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(PriceError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_chart(symbol, &body)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
