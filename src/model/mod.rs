//! Types that represent the core data model, such as `RawTransaction`, `CatalogEntry` and
//! `NormalizedTransaction`.
mod amount;
mod catalog;
mod raw;
mod stock;
mod transaction;

pub use amount::{round2, Amount, AmountError, MONEY_SCALE};
pub use catalog::{catalog_key, CatalogEntry, CatalogError, CatalogIndex};
pub use raw::RawTransaction;
pub use stock::{StockEntry, DEFAULT_UNIT, INITIAL_STOCK_REASON};
pub use transaction::{unknown_name, Financials, NormalizedTransaction, UNKNOWN_PREFIX};
