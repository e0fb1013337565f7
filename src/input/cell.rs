//! Typed spreadsheet cells and the lenient coercions applied to them.
//!
//! None of the coercions here fail. A cell that cannot be read as the requested type becomes
//! `None` (or `0` for integers) and a warning naming the column is logged.

use crate::model::Amount;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Date formats accepted in text cells, tried in order.
const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d"];

/// A single cell value as produced by a CSV or workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
}

pub(super) static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Builds a text cell, mapping blank strings to `Cell::Empty`.
    pub fn text(s: impl AsRef<str>) -> Self {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Trimmed, non-empty text. Non-text cells are not converted.
    pub fn as_text(&self, column: &str) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            other => {
                warn!("Non-string cell type for column {column}. Value: {other:?}");
                None
            }
        }
    }

    /// An integer, truncating fractional numbers. Missing or malformed cells are `0`.
    pub fn as_i64(&self, column: &str) -> i64 {
        match self {
            Cell::Empty => 0,
            Cell::Int(n) => *n,
            Cell::Float(n) => n.trunc() as i64,
            Cell::Text(s) => {
                let s = s.trim();
                match i64::from_str(s) {
                    Ok(n) => n,
                    Err(_) => match f64::from_str(s) {
                        Ok(n) if n.is_finite() => n.trunc() as i64,
                        _ => {
                            warn!("Non-numeric cell type for column {column}. Value: {s:?}");
                            0
                        }
                    },
                }
            }
            other => {
                warn!("Non-numeric cell type for column {column}. Value: {other:?}");
                0
            }
        }
    }

    /// A decimal parsed from a numeric or text cell. Empty cells are `None`.
    pub fn as_decimal(&self, column: &str) -> Option<Decimal> {
        match self {
            Cell::Empty => None,
            Cell::Int(n) => Some(Decimal::from(*n)),
            // The shortest round-trip representation avoids binary float noise like 45.1000001.
            Cell::Float(n) => match Decimal::from_str(&n.to_string()) {
                Ok(d) => Some(d),
                Err(_) => {
                    warn!("Could not parse cell value as a decimal for column {column}. Value: {n}");
                    None
                }
            },
            Cell::Text(s) => match Amount::from_str(s) {
                Ok(_) if s.trim().is_empty() => None,
                Ok(amount) => Some(amount.value()),
                Err(_) => {
                    warn!("Could not parse cell value as a decimal for column {column}. Value: {s:?}");
                    None
                }
            },
            other => {
                warn!("Could not parse cell value as a decimal for column {column}. Value: {other:?}");
                None
            }
        }
    }

    /// A calendar date from a date cell or from `dd.MM.yyyy` / `yyyy-MM-dd` text.
    pub fn as_date(&self, column: &str) -> Option<NaiveDate> {
        match self {
            Cell::Empty => None,
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => {
                let s = s.trim();
                let parsed = DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok());
                if parsed.is_none() {
                    warn!("Could not parse date string '{s}' for column {column}");
                }
                parsed
            }
            other => {
                warn!("Unsupported cell type for date column {column}. Value: {other:?}");
                None
            }
        }
    }
}

/// Converts a spreadsheet date serial (1900 date system) to a calendar date.
pub(crate) fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}
