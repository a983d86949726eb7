//! Keyword scorer.
//!
//! Every keyword is counted independently, overlapping occurrences included.
//! A keyword that is a substring of another keyword in the same category is
//! counted again ("exceed" and "exceeded estimates" both fire on the same span).
//!
//! The score is the total hit count times `weight`, taken from an integer total so the
//! category evaluation order cannot influence the result.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::RuleSet;

/// Default points per keyword hit.
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 2.0;

/// Outcome of scoring one text against a rule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordScore {
    pub score: f64,
    pub categories: BTreeSet<String>,
    /// Hit count per matched category.
    pub hits: BTreeMap<String, u32>,
}

/// Score `text` against `rules`.
pub fn score_text(text: &str, rules: &RuleSet, weight: f64) -> KeywordScore {
    let text = text.to_lowercase();

    let mut hits = BTreeMap::new();
    for rule in rules.rules() {
        let count: u32 = rule
            .keywords
            .iter()
            .map(|kw| count_overlapping(&text, kw))
            .sum();
        if count > 0 {
            hits.insert(rule.name.clone(), count);
        }
    }

    let total: u32 = hits.values().sum();
    KeywordScore {
        score: f64::from(total) * weight,
        categories: hits.keys().cloned().collect(),
        hits,
    }
}

/// Number of (possibly overlapping) occurrences of `needle` in `haystack`.
pub fn count_overlapping(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .char_indices()
        .filter(|(i, _)| haystack[*i..].starts_with(needle))
        .count() as u32
}
