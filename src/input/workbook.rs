//! Reads the first worksheet of an Excel or OpenDocument workbook.

use crate::input::cell::date_from_serial;
use crate::input::Cell;
use crate::Result;
use anyhow::{anyhow, bail};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, warn};

/// Reads the data rows of the first worksheet, skipping the header row.
pub(super) fn read_path(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("Failed to open workbook {}: {e}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    let Some(first) = sheet_names.first() else {
        bail!("Workbook {} contains no sheets", path.display());
    };
    debug!("Reading sheet '{first}' from {}", path.display());

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| anyhow!("Failed to read sheet '{first}' in {}: {e}", path.display()))?;

    Ok(range
        .rows()
        .skip(1)
        .map(|row| row.iter().map(to_cell).collect())
        .collect())
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s),
        Data::Float(n) => Cell::Float(*n),
        Data::Int(n) => Cell::Int(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match date_from_serial(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => {
            // ISO datetimes look like 2024-01-05T00:00:00; only the date part matters.
            let date_part = s.split('T').next().unwrap_or(s);
            match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                Ok(date) => Cell::Date(date),
                Err(_) => Cell::text(s),
            }
        }
        Data::DurationIso(s) => Cell::text(s),
        Data::Error(e) => {
            warn!("Spreadsheet cell contains an error value: {e:?}");
            Cell::Empty
        }
    }
}
