use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit of measure recorded for an ingredient when the stock sheet does not provide one.
pub const DEFAULT_UNIT: &str = "kg/L";

/// Reason recorded on the stock movement that represents the quantity on hand at load time.
pub const INITIAL_STOCK_REASON: &str = "Initial Stock / Last Restock";

/// Represents a single row from the stock (ingredients) sheet.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StockEntry {
    /// External ingredient id, used as the primary key of the ingredients table.
    pub ingredient_id: i64,
    /// Ingredient name, unique across the stock sheet.
    pub name: String,
    /// Quantity currently on hand.
    pub quantity_on_hand: Decimal,
    pub unit_cost: Option<Decimal>,
    pub last_restock: Option<NaiveDate>,
    pub unit_of_measure: Option<String>,
}

impl StockEntry {
    /// The unit of measure, falling back to `DEFAULT_UNIT`.
    pub fn unit(&self) -> &str {
        self.unit_of_measure.as_deref().unwrap_or(DEFAULT_UNIT)
    }
}
