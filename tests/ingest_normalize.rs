// tests/ingest_normalize.rs
use filings_screener::config::MarketSuffixes;
use filings_screener::ingest::providers::{bse::BseFeed, nse::NseFeed};
use filings_screener::ingest::types::{Exchange, FilingFeed};
use filings_screener::ingest::{normalize_batch, normalize_symbol};
use std::fs;

#[tokio::test]
async fn bse_fixture_normalizes_and_drops_missing_symbol() {
    let body = fs::read_to_string("tests/fixtures/bse_announcements.json")
        .expect("missing tests/fixtures/bse_announcements.json");
    let feed = BseFeed::from_fixture_str(&body);
    assert_eq!(feed.exchange(), Exchange::Bse);

    let raw = feed.fetch_raw().await.expect("bse parse ok");
    assert_eq!(raw.len(), 4);

    let (filings, dropped) = normalize_batch(&raw, Exchange::Bse, &MarketSuffixes::default());
    assert_eq!(dropped, 1);
    let symbols: Vec<_> = filings.iter().map(|f| f.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["500325.BO", "532540.BO", "543320.BO"]);

    let first = &filings[0];
    assert!(first.headline.starts_with("Reliance Industries Ltd - Q3 results"));
    assert!(first.text.ends_with("Earnings per share rose 18% year on year."));
    assert_eq!(
        first.date.map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
        Some("2026-02-08 18:05".to_string())
    );
    assert!(filings.iter().all(|f| f.source == Exchange::Bse));
}

#[tokio::test]
async fn nse_fixture_normalizes_symbols_with_suffix() {
    let body = fs::read_to_string("tests/fixtures/nse_announcements.json")
        .expect("missing tests/fixtures/nse_announcements.json");
    let raw = NseFeed::from_fixture_str(&body)
        .fetch_raw()
        .await
        .expect("nse parse ok");
    assert_eq!(raw.len(), 3);

    let (filings, dropped) = normalize_batch(&raw, Exchange::Nse, &MarketSuffixes::default());
    assert_eq!(dropped, 1);
    assert_eq!(filings[0].symbol, "BEL.NS");
    assert_eq!(filings[1].symbol, "INFY.NS");
    assert!(filings[0].date.is_some());
}

#[tokio::test]
async fn broken_payload_is_an_error_not_a_panic() {
    let feed = NseFeed::from_fixture_str("<html>Access Denied</html>");
    assert!(feed.fetch_raw().await.is_err());
}

#[test]
fn normalization_is_idempotent_across_suffixes() {
    for suffix in [None, Some(".NS"), Some(".BO")] {
        for raw in ["bel", " Tata Motors ", "500325", "BEL.NS"] {
            let once = normalize_symbol(raw, suffix).unwrap();
            assert_eq!(normalize_symbol(&once, suffix).unwrap(), once);
            assert_eq!(once, once.to_uppercase());
            assert!(!once.contains(char::is_whitespace));
        }
    }
}
