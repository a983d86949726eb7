// src/ingest/providers/nse.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};

use crate::ingest::providers::records_from_json;
use crate::ingest::types::{Exchange, FilingFeed, RawRecord};

const NSE_API: &str = "https://www.nseindia.com/api/corporate-announcements";

/// NSE corporate announcements. The endpoint answers with either a bare
/// array or `{"data": [...]}`; both are accepted.
///
/// NSE sits behind bot protection and frequently refuses plain clients; the
/// scan reports that as an unavailable source.
pub struct NseFeed {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        days_back: u32,
    },
}

impl NseFeed {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn http(client: reqwest::Client, days_back: u32) -> Self {
        Self {
            mode: Mode::Http { client, days_back },
        }
    }

    fn parse_records_from_str(s: &str) -> Result<Vec<RawRecord>> {
        records_from_json(s, &["data"]).context("parsing nse announcements")
    }
}

#[async_trait]
impl FilingFeed for NseFeed {
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_records_from_str(s),
            Mode::Http { client, days_back } => {
                let to = Local::now().date_naive();
                let from = to - ChronoDuration::days(i64::from(*days_back));
                let resp = client
                    .get(NSE_API)
                    .query(&[
                        ("index", "equities".to_string()),
                        ("from_date", from.format("%d-%m-%Y").to_string()),
                        ("to_date", to.format("%d-%m-%Y").to_string()),
                    ])
                    .send()
                    .await
                    .context("nse http get()")?;
                if !resp.status().is_success() {
                    return Err(anyhow!("nse returned status {}", resp.status()));
                }
                let body = resp.text().await.context("nse http .text()")?;
                Self::parse_records_from_str(&body)
            }
        }
    }

    fn exchange(&self) -> Exchange {
        Exchange::Nse
    }

    fn name(&self) -> &'static str {
        "NSE"
    }
}
