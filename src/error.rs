//! Typed failure kinds for the screening pipeline.
//!
//! Only `ConfigError` is fatal to a scan. Source and enrichment failures are
//! recorded in the scan diagnostics and the scan carries on.

use thiserror::Error;

/// Invalid screener configuration. Rejects a scan before any network activity.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("category rule table is empty")]
    NoCategories,

    #[error("category name must not be blank")]
    BlankCategoryName,

    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),

    #[error("category '{0}' has no keywords")]
    NoKeywords(String),

    #[error("category '{0}' contains a blank keyword")]
    BlankKeyword(String),

    #[error("score threshold must be positive and finite, got {0}")]
    NonPositiveThreshold(f64),

    #[error("keyword weight must be positive and finite, got {0}")]
    NonPositiveWeight(f64),

    #[error("fetch timeout must be at least one second")]
    ZeroTimeout,

    #[error("enrichment concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("enrichment bonus must be non-negative and finite, got {0}")]
    NegativeBonus(f64),

    #[error("fall threshold must be within [0, 1), got {0}")]
    FallThresholdOutOfRange(f64),
}

/// Failure of a single price-history fetch.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("no price data for '{0}'")]
    NoData(String),

    #[error("malformed price payload: {0}")]
    Decode(String),
}
