//! history.rs: in-memory log of finished scans (latest report + short summaries).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scan::ScanReport;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub finished_at: DateTime<Utc>,
    pub picks: usize,
    pub records_read: usize,
    pub records_usable: usize,
    pub failed_sources: Vec<String>,
    // quick fingerprint of the top of the list
    pub top_symbols: Vec<String>, // e.g. ["RELIANCE.NS", "500325.BO"]
    pub top_scores: Vec<f64>,
}

#[derive(Debug)]
pub struct ScanHistory {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<HistoryEntry>,
    last: Option<ScanReport>,
}

impl ScanHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::with_capacity(cap),
                last: None,
            }),
            cap,
        }
    }

    pub fn push(&self, report: &ScanReport) {
        let (symbols, scores): (Vec<String>, Vec<f64>) = report
            .picks
            .iter()
            .take(3)
            .map(|p| (p.symbol.clone(), p.score))
            .unzip();

        let entry = HistoryEntry {
            finished_at: report.finished_at,
            picks: report.picks.len(),
            records_read: report.diagnostics.records_read,
            records_usable: report.diagnostics.records_usable,
            failed_sources: report
                .diagnostics
                .failed_sources
                .iter()
                .map(|f| f.source.clone())
                .collect(),
            top_symbols: symbols,
            top_scores: scores,
        };

        let mut inner = self.inner.lock().expect("history mutex poisoned");
        inner.entries.push(entry);
        if inner.entries.len() > self.cap {
            let excess = inner.entries.len() - self.cap;
            inner.entries.drain(0..excess);
        }
        inner.last = Some(report.clone());
    }

    pub fn last_report(&self) -> Option<ScanReport> {
        self.inner
            .lock()
            .expect("history mutex poisoned")
            .last
            .clone()
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let inner = self.inner.lock().expect("history mutex poisoned");
        let len = inner.entries.len();
        let start = len.saturating_sub(n);
        inner.entries[start..].to_vec()
    }
}
