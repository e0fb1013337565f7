//! Reads the sales, catalog and stock inputs from CSV files or spreadsheet workbooks.
//!
//! Each input has a fixed column layout (see `rows`). A file that cannot be read is logged as an
//! error and yields an empty sequence so that the other inputs and the rest of the run proceed.

mod cell;
mod delimited;
mod rows;
mod workbook;

pub use cell::Cell;

use crate::model::{CatalogEntry, RawTransaction, StockEntry};
use crate::Result;
use anyhow::bail;
use std::path::Path;
use tracing::{debug, error, info};

/// Workbook extensions handed to the spreadsheet reader.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Reads the data rows (header excluded) of the table at `path`, choosing a reader by extension.
pub fn read_table(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    debug!("Reading table {} (extension '{ext}')", path.display());
    if ext == "csv" {
        delimited::read_path(path)
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        workbook::read_path(path)
    } else {
        bail!(
            "Unsupported input file type '{}', expected .csv or one of {}",
            path.display(),
            WORKBOOK_EXTENSIONS.join(", ")
        )
    }
}

/// Reads the sales file, dropping rows with a non-positive quantity or price.
pub fn read_sales(path: &Path) -> Vec<RawTransaction> {
    let rows = table_or_empty(path, "sales");
    let total = rows.len();
    let sales: Vec<RawTransaction> = rows
        .iter()
        .map(|row| rows::sale(row))
        .filter(rows::accept_sale)
        .collect();
    info!(
        "Read {} sales rows from {} ({} dropped at ingestion)",
        sales.len(),
        path.display(),
        total - sales.len()
    );
    sales
}

/// Reads the product catalog, dropping rows without a name.
pub fn read_catalog(path: &Path) -> Vec<CatalogEntry> {
    let entries: Vec<CatalogEntry> = table_or_empty(path, "catalog")
        .iter()
        .filter_map(|row| rows::catalog(row))
        .collect();
    info!("Read {} catalog entries from {}", entries.len(), path.display());
    entries
}

/// Reads the ingredient stock file, dropping rows without a name.
pub fn read_stock(path: &Path) -> Vec<StockEntry> {
    let entries: Vec<StockEntry> = table_or_empty(path, "stock")
        .iter()
        .filter_map(|row| rows::stock(row))
        .collect();
    info!("Read {} stock entries from {}", entries.len(), path.display());
    entries
}

fn table_or_empty(path: &Path, what: &str) -> Vec<Vec<Cell>> {
    match read_table(path) {
        Ok(rows) => rows,
        Err(e) => {
            error!("Unable to read the {what} file {}: {e:#}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_sales_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "sales.csv",
            "\
sale_id,date,item_name,quantity,price_per_item,payment_method,barista_name
1,05.01.2024,Капучино,2,45.00,cash,Olena
2,05.01.2024,Лате,0,50.00,card,Ivan
3,2024-01-06,Лате,1,0,card,Ivan
4,06.01.2024, Mystery Drink ,1,30,card, Ivan
",
        );
        let sales = read_sales(&path);
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].transaction_id, 1);
        assert_eq!(sales[0].date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(sales[1].transaction_id, 4);
        assert_eq!(sales[1].product_name.as_deref(), Some("Mystery Drink"));
        assert_eq!(sales[1].staff_name.as_deref(), Some("Ivan"));
    }

    #[test]
    fn test_read_catalog_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "catalog.csv",
            "\
menu_item_id,item_name_standard,category,standard_price,cost_per_unit
10,Капучино,Coffee,45.00,20.00
11,,Coffee,50.00,22.00
12,Круасан,Bakery,35.00,
",
        );
        let catalog = read_catalog(&path);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].product_id, 10);
        assert_eq!(catalog[0].unit_cost, Some(Decimal::from_str("20.00").unwrap()));
        assert_eq!(catalog[1].product_id, 12);
        assert_eq!(catalog[1].unit_cost, None);
    }

    #[test]
    fn test_read_stock_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "stock.csv",
            "\
ingredient_id,ingredient_name,current_stock,unit_cost,last_restock_date
1,Молоко,12.5,32.00,03.01.2024
2,Кава,4,410.00,
",
        );
        let stock = read_stock(&path);
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].last_restock, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(stock[1].last_restock, None);
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_sales(&dir.path().join("nope.csv")).is_empty());
        assert!(read_catalog(&dir.path().join("nope.xlsx")).is_empty());
        assert!(read_stock(&dir.path().join("nope.ods")).is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sales.txt", "a,b\n1,2\n");
        let err = read_table(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported input file type"));
        assert!(read_sales(&path).is_empty());
    }
}
