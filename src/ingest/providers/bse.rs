// src/ingest/providers/bse.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};

use crate::ingest::providers::records_from_json;
use crate::ingest::types::{Exchange, FilingFeed, RawRecord};

const BSE_API: &str = "https://api.bseindia.com/BseIndiaAPI/api/AnnSubCategoryGetData/w";
const BSE_REFERER: &str = "https://www.bseindia.com/";
const MAX_PAGES: u32 = 10;

/// BSE corporate announcements (JSON API, `{"Table": [...]}` payload).
pub struct BseFeed {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        days_back: u32,
    },
}

impl BseFeed {
    /// Serve a recorded payload; used by tests and offline runs.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    /// Live feed covering the last `days_back` days.
    pub fn http(client: reqwest::Client, days_back: u32) -> Self {
        Self {
            mode: Mode::Http { client, days_back },
        }
    }

    fn parse_records_from_str(s: &str) -> Result<Vec<RawRecord>> {
        records_from_json(s, &["Table", "data"]).context("parsing bse announcements")
    }

    async fn fetch_http(client: &reqwest::Client, days_back: u32) -> Result<Vec<RawRecord>> {
        let to = Local::now().date_naive();
        let from = to - ChronoDuration::days(i64::from(days_back));
        let (from, to) = (from.format("%Y%m%d").to_string(), to.format("%Y%m%d").to_string());

        let mut out = Vec::new();
        for page in 1..=MAX_PAGES {
            let page = page.to_string();
            let resp = client
                .get(BSE_API)
                .header(reqwest::header::REFERER, BSE_REFERER)
                .query(&[
                    ("pageno", page.as_str()),
                    ("strCat", "-1"),
                    ("strPrevDate", from.as_str()),
                    ("strScrip", ""),
                    ("strSearch", "P"),
                    ("strToDate", to.as_str()),
                    ("strType", "C"),
                    ("subcategory", "-1"),
                ])
                .send()
                .await
                .context("bse http get()")?;
            if !resp.status().is_success() {
                return Err(anyhow!("bse returned status {}", resp.status()));
            }
            let body = resp.text().await.context("bse http .text()")?;
            let mut records = Self::parse_records_from_str(&body)?;
            if records.is_empty() {
                break;
            }
            out.append(&mut records);
        }
        Ok(out)
    }
}

#[async_trait]
impl FilingFeed for BseFeed {
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_records_from_str(s),
            Mode::Http { client, days_back } => Self::fetch_http(client, *days_back).await,
        }
    }

    fn exchange(&self) -> Exchange {
        Exchange::Bse
    }

    fn name(&self) -> &'static str {
        "BSE"
    }
}
