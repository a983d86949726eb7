//! Category → keyword rule table.
//!
//! Loaded once per process (see `config`) and read-only during a scan.
//! Keywords are lower-cased when the table is built so the scorer only has to
//! lower-case the filing text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ConfigError;

/// One named heuristic bucket (e.g. "order_win") and its keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<N, I, K>(name: N, keywords: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Validated rule table. Construct through [`RuleSet::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    /// Validate and lower-case a rule table.
    ///
    /// Category names are trimmed; keywords are trimmed and lower-cased but
    /// never deduplicated.
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(rules.len());
        for rule in rules {
            let name = rule.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::BlankCategoryName);
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateCategory(name));
            }
            if rule.keywords.is_empty() {
                return Err(ConfigError::NoKeywords(name));
            }
            let mut keywords = Vec::with_capacity(rule.keywords.len());
            for kw in rule.keywords {
                let kw = kw.trim().to_lowercase();
                if kw.is_empty() {
                    return Err(ConfigError::BlankKeyword(name));
                }
                keywords.push(kw);
            }
            out.push(CategoryRule { name, keywords });
        }

        Ok(Self { rules: out })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Built-in table: EPS beats, stake buys, order wins and friends.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "beat_expectations",
            ["beat", "exceed", "above expectation", "surpassed"],
        ),
        CategoryRule::new(
            "eps_growth",
            ["eps growth", "earnings per share", "eps increase", "% eps"],
        ),
        CategoryRule::new(
            "beaten_down",
            ["52 week low", "down %", "fallen sharply", "oversold"],
        ),
        CategoryRule::new(
            "stake_acquired",
            [
                "acquired stake",
                "controlling stake",
                "promoter stake",
                "increased stake",
            ],
        ),
        CategoryRule::new(
            "famous_invest",
            [
                "invested",
                "rakesh jhunjhunwala",
                "radhakrishnan damani",
                "warren buffett",
                "billionaire",
            ],
        ),
        CategoryRule::new(
            "order_win",
            ["order win", "contract win", "large order", "rs crore order"],
        ),
    ]
}
