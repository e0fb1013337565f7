//! Turns validated raw sales rows into `NormalizedTransaction`s.

use crate::model::{
    catalog_key, unknown_name, Amount, CatalogEntry, CatalogIndex, Financials,
    NormalizedTransaction, RawTransaction,
};
use crate::transform::AliasRules;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// Why a raw row was not accepted by the normalizer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingDate,
    MissingProductName,
    MissingPaymentMethod,
    MissingStaffName,
    MissingUnitPrice,
    NegativeUnitPrice,
    NonPositiveQuantity,
    AmountOverflow,
}

serde_plain::derive_display_from_serialize!(RejectReason);
serde_plain::derive_fromstr_from_deserialize!(RejectReason);

/// A raw row that was rejected, along with the reason.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Rejection {
    transaction_id: i64,
    reason: RejectReason,
}

impl Rejection {
    pub fn transaction_id(&self) -> i64 {
        self.transaction_id
    }

    pub fn reason(&self) -> RejectReason {
        self.reason
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sale {} rejected: {}",
            self.transaction_id, self.reason
        )
    }
}

impl StdError for Rejection {}

/// The result of normalizing a whole batch.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedTransaction>,
    pub rejected: usize,
}

/// Validates raw rows, standardizes product names against a `CatalogIndex` and computes the
/// money fields. Apart from logging, `normalize` is a pure function of its inputs.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    index: &'a CatalogIndex,
    aliases: &'a AliasRules,
}

impl<'a> Normalizer<'a> {
    pub fn new(index: &'a CatalogIndex, aliases: &'a AliasRules) -> Self {
        Self { index, aliases }
    }

    /// Normalizes a single raw row or explains why it cannot be.
    ///
    /// Note that a unit price of exactly zero passes here; zero prices are filtered earlier,
    /// when rows are read.
    pub fn normalize(&self, raw: &RawTransaction) -> Result<NormalizedTransaction, Rejection> {
        let reject = |reason| Rejection {
            transaction_id: raw.transaction_id,
            reason,
        };

        let date = raw.date.ok_or_else(|| reject(RejectReason::MissingDate))?;
        let raw_name = raw
            .product_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| reject(RejectReason::MissingProductName))?;
        let payment_method = raw
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| reject(RejectReason::MissingPaymentMethod))?;
        let staff_name = raw
            .staff_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| reject(RejectReason::MissingStaffName))?;
        let unit_price = raw
            .unit_price
            .ok_or_else(|| reject(RejectReason::MissingUnitPrice))?;
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(reject(RejectReason::NegativeUnitPrice));
        }
        if raw.quantity <= 0 {
            return Err(reject(RejectReason::NonPositiveQuantity));
        }

        let matched = self.standardize(raw_name);
        let standardized_name = match matched {
            Some(entry) => entry.name.clone(),
            None => {
                warn!(
                    "Could not standardize item name '{raw_name}' for sale {}",
                    raw.transaction_id
                );
                unknown_name(raw_name)
            }
        };

        let unit_cost = matched.and_then(|entry| entry.unit_cost);
        if unit_cost.is_none() {
            warn!(
                "Cannot calculate profit for sale {} due to unknown cost per unit",
                raw.transaction_id
            );
        }
        let financials = Financials::compute(unit_price, raw.quantity, unit_cost)
            .ok_or_else(|| reject(RejectReason::AmountOverflow))?;

        Ok(NormalizedTransaction {
            transaction_id: raw.transaction_id,
            date,
            raw_name: raw_name.to_string(),
            standardized_name,
            matched: matched.is_some(),
            quantity: raw.quantity,
            unit_price: Amount::new(unit_price),
            payment_method: payment_method.to_string(),
            staff_name: staff_name.to_string(),
            financials,
        })
    }

    /// Normalizes every row, logging and counting the rejected ones.
    pub fn normalize_all<'r>(&self, raws: impl IntoIterator<Item = &'r RawTransaction>) -> Normalized {
        let mut out = Normalized::default();
        let mut seen = 0usize;
        for raw in raws {
            seen += 1;
            match self.normalize(raw) {
                Ok(record) => out.records.push(record),
                Err(rejection) => {
                    warn!("Invalid record found: {rejection}");
                    debug!("{raw:?}");
                    out.rejected += 1;
                }
            }
        }
        info!(
            "Processed {seen} raw sales into {} valid records",
            out.records.len()
        );
        out
    }

    /// Exact key match first, then the first alias rule whose pattern occurs in the name.
    fn standardize(&self, raw_name: &str) -> Option<&'a CatalogEntry> {
        let key = catalog_key(raw_name);
        if let Some(entry) = self.index.get(&key) {
            return Some(entry);
        }
        let canonical = self.aliases.canonical_for(&key)?;
        self.index.get(canonical)
    }
}
