// src/analyze/mod.rs
//! Scoring stage: category rules and the keyword scorer.

pub mod rules;
pub mod scoring;

pub use crate::analyze::rules::{default_rules, CategoryRule, RuleSet};
pub use crate::analyze::scoring::{score_text, KeywordScore, DEFAULT_KEYWORD_WEIGHT};
