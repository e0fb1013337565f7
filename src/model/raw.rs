use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One sales row as it comes out of the tabular reader. Cell coercion has already happened, so
/// malformed or empty cells show up as `None` (or `0` for the integer columns).
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawTransaction {
    pub transaction_id: i64,
    pub date: Option<NaiveDate>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Option<Decimal>,
    pub payment_method: Option<String>,
    pub staff_name: Option<String>,
}
