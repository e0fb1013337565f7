//! Substring alias rules used when a sales product name does not exactly match the catalog.

use crate::model::catalog_key;
use serde::{Deserialize, Serialize};

/// If a normalized sales name contains `contains`, it is treated as the catalog product whose
/// key is `canonical`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "AliasRuleFile")]
pub struct AliasRule {
    contains: String,
    canonical: String,
}

/// The shape of a rule as written in `config.json`, before key normalization.
#[derive(Deserialize)]
struct AliasRuleFile {
    contains: String,
    canonical: String,
}

impl From<AliasRuleFile> for AliasRule {
    fn from(value: AliasRuleFile) -> Self {
        AliasRule::new(value.contains, value.canonical)
    }
}

impl AliasRule {
    /// Both sides are stored in catalog key form (trimmed, lower-cased).
    pub fn new(contains: impl AsRef<str>, canonical: impl AsRef<str>) -> Self {
        Self {
            contains: catalog_key(contains.as_ref()),
            canonical: catalog_key(canonical.as_ref()),
        }
    }

    pub fn contains(&self) -> &str {
        &self.contains
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// An ordered table of `AliasRule`s. Order matters: the first rule whose pattern is found wins.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasRules(Vec<AliasRule>);

impl Default for AliasRules {
    /// Spelling variants seen in the shop's till exports.
    fn default() -> Self {
        Self(vec![
            AliasRule::new("латте", "лате"),
            AliasRule::new("latte", "лате"),
            AliasRule::new("капучино", "капучино"),
            AliasRule::new("cappuccino", "капучино"),
        ])
    }
}

impl AliasRules {
    pub fn new(rules: impl IntoIterator<Item = AliasRule>) -> Self {
        Self(rules.into_iter().collect())
    }

    /// Returns the canonical key of the first rule whose pattern occurs in `key`. `key` must
    /// already be in catalog key form. Rules with an empty pattern never match.
    pub fn canonical_for(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|rule| !rule.contains.is_empty() && key.contains(rule.contains.as_str()))
            .map(|rule| rule.canonical())
    }
}
