// src/config/mod.rs
//! Screener configuration (TOML or JSON).
//!
//! Lookup order for [`load_default`]:
//! 1) `$SCREENER_CONFIG_PATH`
//! 2) `config/screener.toml`
//! 3) `config/screener.json`
//! 4) built-in defaults

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyze::{default_rules, CategoryRule, RuleSet, DEFAULT_KEYWORD_WEIGHT};
use crate::error::ConfigError;
use crate::ingest::types::Exchange;

pub const ENV_CONFIG_PATH: &str = "SCREENER_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/screener.toml";
pub const DEFAULT_JSON_PATH: &str = "config/screener.json";

fn default_threshold() -> f64 {
    2.0
}
fn default_weight() -> f64 {
    DEFAULT_KEYWORD_WEIGHT
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_days_back() -> u32 {
    7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Picks must score strictly above this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Top-N cap applied after sorting. `None` keeps every pick.
    #[serde(default)]
    pub max_picks: Option<usize>,
    #[serde(default = "default_weight")]
    pub keyword_weight: f64,
    /// Timeout for every external call (feeds and price history).
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Announcement window requested from the exchange feeds.
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub markets: MarketSuffixes,
    #[serde(default = "default_rules")]
    pub categories: Vec<CategoryRule>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_picks: None,
            keyword_weight: default_weight(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            days_back: default_days_back(),
            enrichment: EnrichmentConfig::default(),
            markets: MarketSuffixes::default(),
            categories: default_rules(),
        }
    }
}

impl ScreenerConfig {
    /// Check every knob and build the rule table. This is the only place a
    /// scan can fail fatally.
    pub fn validate(&self) -> Result<RuleSet, ConfigError> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ConfigError::NonPositiveThreshold(self.threshold));
        }
        if !(self.keyword_weight.is_finite() && self.keyword_weight > 0.0) {
            return Err(ConfigError::NonPositiveWeight(self.keyword_weight));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.enrichment.validate()?;
        RuleSet::new(self.categories.clone())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    300
}
fn default_lookback_days() -> u32 {
    365
}
fn default_fall_threshold() -> f64 {
    0.30
}
fn default_bonus() -> f64 {
    3.0
}
fn default_concurrency() -> usize {
    8
}

/// Price-context enrichment knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Bonus applies when the fall from peak is strictly above this.
    #[serde(default = "default_fall_threshold")]
    pub fall_threshold: f64,
    #[serde(default = "default_bonus")]
    pub bonus: f64,
    /// Max concurrent price fetches per scan.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            lookback_days: default_lookback_days(),
            fall_threshold: default_fall_threshold(),
            bonus: default_bonus(),
            concurrency: default_concurrency(),
        }
    }
}

impl EnrichmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if !(self.bonus.is_finite() && self.bonus >= 0.0) {
            return Err(ConfigError::NegativeBonus(self.bonus));
        }
        if !(0.0..1.0).contains(&self.fall_threshold) {
            return Err(ConfigError::FallThresholdOutOfRange(self.fall_threshold));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_bse_suffix() -> Option<String> {
    Some(".BO".to_string())
}
fn default_nse_suffix() -> Option<String> {
    Some(".NS".to_string())
}

/// Ticker suffix the price provider expects per exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSuffixes {
    #[serde(default = "default_bse_suffix")]
    pub bse_suffix: Option<String>,
    #[serde(default = "default_nse_suffix")]
    pub nse_suffix: Option<String>,
}

impl Default for MarketSuffixes {
    fn default() -> Self {
        Self {
            bse_suffix: default_bse_suffix(),
            nse_suffix: default_nse_suffix(),
        }
    }
}

impl MarketSuffixes {
    /// No suffixes at all; symbols are kept as the exchange reports them.
    pub fn none() -> Self {
        Self {
            bse_suffix: None,
            nse_suffix: None,
        }
    }

    pub fn for_exchange(&self, exchange: Exchange) -> Option<&str> {
        match exchange {
            Exchange::Bse => self.bse_suffix.as_deref(),
            Exchange::Nse => self.nse_suffix.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }
}

/// Load config from an explicit path. Format follows the extension; anything
/// other than `.json` is read as TOML.
pub fn load_from(path: &Path) -> Result<ScreenerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading screener config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load config using env var + fallbacks (see module docs).
pub fn load_default() -> Result<ScreenerConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(ScreenerConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ScreenerConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing screener config json");
    }
    toml::from_str(s).context("parsing screener config toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = ScreenerConfig::default();
        let rules = cfg.validate().unwrap();
        assert_eq!(rules.len(), 6);
        assert_eq!(cfg.enrichment.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = parse_config(
            r#"
threshold = 4.0

[enrichment]
enabled = false

[[categories]]
name = "order_win"
keywords = ["order win"]
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.threshold, 4.0);
        assert!(!cfg.enrichment.enabled);
        assert_eq!(cfg.enrichment.bonus, 3.0);
        assert_eq!(cfg.categories.len(), 1);
        assert_eq!(cfg.markets.bse_suffix.as_deref(), Some(".BO"));
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let cfg = ScreenerConfig {
            threshold: 0.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveThreshold(0.0)));

        let cfg = ScreenerConfig {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositiveThreshold(_))
        ));
    }

    #[test]
    fn rejects_bad_enrichment_knobs() {
        let mut cfg = ScreenerConfig::default();
        cfg.enrichment.concurrency = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroConcurrency));

        let mut cfg = ScreenerConfig::default();
        cfg.enrichment.fall_threshold = 1.5;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::FallThresholdOutOfRange(1.5))
        );
    }

    #[test]
    fn blank_suffix_counts_as_none() {
        let m = MarketSuffixes {
            bse_suffix: Some("  ".into()),
            nse_suffix: Some(".NS".into()),
        };
        assert_eq!(m.for_exchange(Exchange::Bse), None);
        assert_eq!(m.for_exchange(Exchange::Nse), Some(".NS"));
    }
}
