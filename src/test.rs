//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::InputPaths;
use crate::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Seven sales rows: one is dropped when read (zero quantity), one is rejected by the normalizer
/// (no payment method), one repeats sale 1, one has no catalog match and one is found through an
/// alias rule.
pub(crate) const SAMPLE_SALES_CSV: &str = "\
sale_id,date,item_name,quantity,price_per_item,payment_method,barista_name
1,05.01.2024,Капучино,2,45.00,cash,Olena
2,05.01.2024,латте,1,50.00,card,Ivan
3,05.01.2024,Mystery Drink,1,30.00,card,Ivan
4,06.01.2024,Лате,0,50.00,card,Ivan
5,06.01.2024,Лате,1,50.00,,Ivan
1,06.01.2024,Капучино,5,45.00,cash,Olena
6,06.01.2024,Cappuccino large,1,45.00,card, Petro
";

pub(crate) const SAMPLE_CATALOG_CSV: &str = "\
menu_item_id,item_name_standard,category,standard_price,cost_per_unit
10,Капучино,Coffee,45.00,20.00
11,Лате,Coffee,50.00,22.00
";

pub(crate) const SAMPLE_STOCK_CSV: &str = "\
ingredient_id,ingredient_name,current_stock,unit_cost,last_restock_date,unit_of_measure
1,Молоко,12.5,32.00,03.01.2024,L
2,Кава,4,410.00,,
";

/// Test environment that sets up a pos home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
///
/// The config points at `data/sales.csv`, `data/catalog.csv` and `data/stock.csv`, which do not
/// exist until written with `write_input` or `write_sample_inputs`.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("pos");
        let inputs = InputPaths {
            sales: Some(PathBuf::from("data/sales.csv")),
            catalog: Some(PathBuf::from("data/catalog.csv")),
            stock: Some(PathBuf::from("data/stock.csv")),
        };
        let config = Config::create(&root, &inputs).await.unwrap();
        std::fs::create_dir_all(config.root().join("data")).unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// Writes `contents` to `data/<name>` in the home directory and returns the full path.
    pub(crate) fn write_input(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.config.root().join("data").join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Writes the sample sales, catalog and stock files to the configured input paths.
    pub(crate) fn write_sample_inputs(&self) {
        self.write_input("sales.csv", SAMPLE_SALES_CSV);
        self.write_input("catalog.csv", SAMPLE_CATALOG_CSV);
        self.write_input("stock.csv", SAMPLE_STOCK_CSV);
    }
}
