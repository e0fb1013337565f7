use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prefix of the standardized name given to a sale whose product could not be matched against
/// the catalog.
pub const UNKNOWN_PREFIX: &str = "Unknown / ";

/// The derived money fields of a sale. Each field is rounded half-up to two places on its own.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Financials {
    pub total_sale: Amount,
    pub profit_per_unit: Amount,
    pub total_profit: Amount,
}

impl Financials {
    /// Computes the totals for `quantity` units sold at `unit_price`.
    ///
    /// - `total_sale = round2(unit_price * quantity)`
    /// - `profit_per_unit = round2(unit_price - unit_cost)`
    /// - `total_profit = round2(profit_per_unit * quantity)`, using the rounded per-unit profit
    ///
    /// When `unit_cost` is `None` both profit fields are zero. Returns `None` if any field does
    /// not fit in a `Decimal`.
    pub fn compute(unit_price: Decimal, quantity: i64, unit_cost: Option<Decimal>) -> Option<Self> {
        let total_sale = Amount::new(unit_price).times(quantity)?;
        let financials = match unit_cost {
            Some(cost) => {
                let profit_per_unit = Amount::new(unit_price.checked_sub(cost)?).round2();
                Self {
                    total_sale,
                    profit_per_unit,
                    total_profit: profit_per_unit.times(quantity)?,
                }
            }
            None => Self {
                total_sale,
                profit_per_unit: Amount::ZERO.round2(),
                total_profit: Amount::ZERO.round2(),
            },
        };
        Some(financials)
    }
}

/// A validated, standardized sale ready to be loaded. Values of this type are only produced by
/// the normalizer and are never modified afterwards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NormalizedTransaction {
    pub(crate) transaction_id: i64,
    pub(crate) date: NaiveDate,
    pub(crate) raw_name: String,
    pub(crate) standardized_name: String,
    /// `true` when `standardized_name` came from a catalog entry rather than the unknown sentinel.
    pub(crate) matched: bool,
    pub(crate) quantity: i64,
    pub(crate) unit_price: Amount,
    pub(crate) payment_method: String,
    pub(crate) staff_name: String,
    #[serde(flatten)]
    pub(crate) financials: Financials,
}

impl NormalizedTransaction {
    pub fn transaction_id(&self) -> i64 {
        self.transaction_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn standardized_name(&self) -> &str {
        &self.standardized_name
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn staff_name(&self) -> &str {
        &self.staff_name
    }

    pub fn total_sale(&self) -> Amount {
        self.financials.total_sale
    }

    pub fn profit_per_unit(&self) -> Amount {
        self.financials.profit_per_unit
    }

    pub fn total_profit(&self) -> Amount {
        self.financials.total_profit
    }
}

/// The sentinel standardized name for a product that did not match the catalog.
pub fn unknown_name(raw_name: &str) -> String {
    format!("{UNKNOWN_PREFIX}{raw_name}")
}
