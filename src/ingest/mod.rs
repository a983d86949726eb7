// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::MarketSuffixes;
use crate::ingest::types::{Exchange, FilingFeed, Filing, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::time::Duration;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_records_total", "Raw records fetched from feeds.");
        describe_counter!(
            "ingest_dropped_total",
            "Raw records dropped for lacking a usable symbol."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Feed fetch/parse errors and timeouts."
        );
        describe_histogram!("ingest_fetch_ms", "Feed fetch time in milliseconds.");
    });
}

const SYMBOL_KEYS: &[&str] = &["symbol", "scripcode", "scrip_cd", "ticker"];
const SUBJECT_KEYS: &[&str] = &["subject", "newssub", "desc", "title"];
const SUMMARY_KEYS: &[&str] = &["summary", "headline", "attchmnttext", "details"];
const DATE_KEYS: &[&str] = &["date", "datetime", "news_dt", "an_dt", "sort_date", "dissemdt"];

const DATETIME_FORMATS: &[&str] = &[
    "%d-%b-%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%Y-%m-%d", "%d-%b-%Y"];

/// Clean a text fragment: decode entities, strip tags, fold whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (nbsp included)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    // 5) Length cap: 4000 chars (filing summaries run long)
    let out = out.trim();
    if out.chars().count() > 4000 {
        return out.chars().take(4000).collect();
    }
    out.to_string()
}

/// Canonical ticker: no whitespace, uppercase, market suffix exactly once.
///
/// Idempotent: feeding the output back in returns it unchanged.
pub fn normalize_symbol(raw: &str, suffix: Option<&str>) -> Option<String> {
    let mut sym: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if sym.is_empty() {
        return None;
    }

    if let Some(suffix) = suffix.map(|s| s.trim().to_uppercase()) {
        if !suffix.is_empty() {
            if sym == suffix {
                return None;
            }
            if !sym.ends_with(&suffix) {
                sym.push_str(&suffix);
            }
        }
    }
    Some(sym)
}

/// Parse the date formats the exchanges use. `None` when nothing fits.
pub fn parse_filing_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for f in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Case-insensitive lookup of the first alias present with a usable value.
fn field(rec: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        rec.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(alias))
            .and_then(|(_, v)| value_to_string(v))
    })
}

fn value_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Raw record → `Filing`. `None` when no usable symbol can be derived.
pub fn normalize_record(
    rec: &RawRecord,
    exchange: Exchange,
    suffixes: &MarketSuffixes,
) -> Option<Filing> {
    let symbol = field(rec, SYMBOL_KEYS)
        .and_then(|s| normalize_symbol(&s, suffixes.for_exchange(exchange)))?;

    let subject = field(rec, SUBJECT_KEYS)
        .map(|s| normalize_text(&s))
        .unwrap_or_default();
    let summary = field(rec, SUMMARY_KEYS)
        .map(|s| normalize_text(&s))
        .unwrap_or_default();
    let date = field(rec, DATE_KEYS).and_then(|s| parse_filing_date(&s));

    Some(Filing {
        symbol,
        text: format!("{subject} {summary}"),
        headline: subject,
        date,
        source: exchange,
    })
}

/// Normalize a batch, preserving input order.
/// Returns (filings, dropped_count).
pub fn normalize_batch(
    records: &[RawRecord],
    exchange: Exchange,
    suffixes: &MarketSuffixes,
) -> (Vec<Filing>, usize) {
    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        match normalize_record(rec, exchange, suffixes) {
            Some(f) => out.push(f),
            None => {
                dropped += 1;
                tracing::debug!(target: "ingest", %exchange, "dropping record without usable symbol");
            }
        }
    }
    (out, dropped)
}

/// A feed that could not be read during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Records fetched from one feed, tagged with its exchange.
#[derive(Debug, Clone)]
pub struct FeedBatch {
    pub exchange: Exchange,
    pub records: Vec<RawRecord>,
}

/// Fetch every feed once with a per-call timeout.
/// Failing feeds are reported, the rest are returned in feed order.
pub async fn fetch_all(
    feeds: &[Box<dyn FilingFeed>],
    timeout: Duration,
) -> (Vec<FeedBatch>, Vec<SourceFailure>) {
    ensure_metrics_described();

    let mut batches = Vec::with_capacity(feeds.len());
    let mut failures = Vec::new();
    for feed in feeds {
        let t0 = std::time::Instant::now();
        let outcome = tokio::time::timeout(timeout, feed.fetch_raw()).await;
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let reason = match outcome {
            Ok(Ok(records)) => {
                counter!("ingest_records_total").increment(records.len() as u64);
                tracing::info!(target: "ingest", feed = feed.name(), records = records.len(), "feed fetched");
                batches.push(FeedBatch {
                    exchange: feed.exchange(),
                    records,
                });
                continue;
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(_) => format!("timed out after {}s", timeout.as_secs_f64()),
        };

        tracing::warn!(target: "ingest", feed = feed.name(), %reason, "feed unavailable");
        counter!("ingest_source_errors_total").increment(1);
        failures.push(SourceFailure {
            source: feed.name().to_string(),
            reason,
        });
    }
    (batches, failures)
}

/// Normalize all fetched batches in feed order, each batch newest first
/// (undated filings last, ties keep feed order).
/// Returns (filings, records_read, dropped).
pub fn normalize_all(batches: &[FeedBatch], suffixes: &MarketSuffixes) -> (Vec<Filing>, usize, usize) {
    let mut filings = Vec::new();
    let mut read = 0usize;
    let mut dropped = 0usize;
    for b in batches {
        read += b.records.len();
        let (mut f, d) = normalize_batch(&b.records, b.exchange, suffixes);
        f.sort_by(|x, y| y.date.cmp(&x.date));
        dropped += d;
        filings.append(&mut f);
    }
    counter!("ingest_dropped_total").increment(dropped as u64);
    (filings, read, dropped)
}
