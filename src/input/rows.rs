//! Fixed column schemas of the three input sheets and the row conversions that use them.

use crate::input::cell::EMPTY;
use crate::input::Cell;
use crate::model::{CatalogEntry, RawTransaction, StockEntry};
use rust_decimal::Decimal;
use tracing::warn;

pub(super) const SALE_ID_IDX: usize = 0;
pub(super) const SALE_DATE_IDX: usize = 1;
pub(super) const ITEM_NAME_IDX: usize = 2;
pub(super) const QUANTITY_IDX: usize = 3;
pub(super) const PRICE_PER_ITEM_IDX: usize = 4;
pub(super) const PAYMENT_METHOD_IDX: usize = 5;
pub(super) const STAFF_NAME_IDX: usize = 6;

pub(super) const PRODUCT_ID_IDX: usize = 0;
pub(super) const PRODUCT_NAME_IDX: usize = 1;
pub(super) const CATEGORY_IDX: usize = 2;
pub(super) const STANDARD_PRICE_IDX: usize = 3;
pub(super) const COST_PER_UNIT_IDX: usize = 4;

pub(super) const INGREDIENT_ID_IDX: usize = 0;
pub(super) const INGREDIENT_NAME_IDX: usize = 1;
pub(super) const CURRENT_STOCK_IDX: usize = 2;
pub(super) const UNIT_COST_IDX: usize = 3;
pub(super) const LAST_RESTOCK_IDX: usize = 4;
pub(super) const UNIT_OF_MEASURE_IDX: usize = 5;

fn cell(row: &[Cell], ix: usize) -> &Cell {
    row.get(ix).unwrap_or(&EMPTY)
}

pub(super) fn sale(row: &[Cell]) -> RawTransaction {
    RawTransaction {
        transaction_id: cell(row, SALE_ID_IDX).as_i64("sale_id"),
        date: cell(row, SALE_DATE_IDX).as_date("date"),
        product_name: cell(row, ITEM_NAME_IDX).as_text("item_name"),
        quantity: cell(row, QUANTITY_IDX).as_i64("quantity"),
        unit_price: cell(row, PRICE_PER_ITEM_IDX).as_decimal("price_per_item"),
        payment_method: cell(row, PAYMENT_METHOD_IDX).as_text("payment_method"),
        staff_name: cell(row, STAFF_NAME_IDX).as_text("barista_name"),
    }
}

/// The ingestion filter: a sale needs a positive quantity and a strictly positive unit price.
/// Zero prices are rejected here even though the normalizer would accept them.
pub(super) fn accept_sale(raw: &RawTransaction) -> bool {
    if raw.quantity <= 0 {
        warn!("Invalid quantity (<=0) for sale_id: {}", raw.transaction_id);
        return false;
    }
    match raw.unit_price {
        Some(price) if price > Decimal::ZERO => true,
        _ => {
            warn!(
                "Invalid price_per_item (<=0 or missing) for sale_id: {}",
                raw.transaction_id
            );
            false
        }
    }
}

pub(super) fn catalog(row: &[Cell]) -> Option<CatalogEntry> {
    let product_id = cell(row, PRODUCT_ID_IDX).as_i64("menu_item_id");
    let Some(name) = cell(row, PRODUCT_NAME_IDX).as_text("item_name_standard") else {
        warn!("Missing standardized item name for menu_item_id: {product_id}");
        return None;
    };
    Some(CatalogEntry {
        product_id,
        name,
        category: cell(row, CATEGORY_IDX).as_text("category"),
        standard_price: cell(row, STANDARD_PRICE_IDX)
            .as_decimal("standard_price")
            .unwrap_or_default(),
        unit_cost: cell(row, COST_PER_UNIT_IDX).as_decimal("cost_per_unit"),
    })
}

pub(super) fn stock(row: &[Cell]) -> Option<StockEntry> {
    let ingredient_id = cell(row, INGREDIENT_ID_IDX).as_i64("ingredient_id");
    let Some(name) = cell(row, INGREDIENT_NAME_IDX).as_text("ingredient_name") else {
        warn!("Missing ingredient name for ingredient_id: {ingredient_id}");
        return None;
    };
    Some(StockEntry {
        ingredient_id,
        name,
        quantity_on_hand: cell(row, CURRENT_STOCK_IDX)
            .as_decimal("current_stock")
            .unwrap_or_default(),
        unit_cost: cell(row, UNIT_COST_IDX).as_decimal("unit_cost"),
        last_restock: cell(row, LAST_RESTOCK_IDX).as_date("last_restock_date"),
        unit_of_measure: cell(row, UNIT_OF_MEASURE_IDX).as_text("unit_of_measure"),
    })
}
