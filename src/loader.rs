//! Loads a normalized batch into the store, resolving staff and product names to store ids.
//!
//! The groups are written strictly in order: staff, products, ingredients with their stock
//! movements, and finally sales. Sales depend on the staff and product rows written before them.

use crate::db::{Db, SaleFact};
use crate::model::{Amount, CatalogEntry, NormalizedTransaction, StockEntry};
use crate::Result;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// The data for one load run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoadBatch<'a> {
    pub(crate) sales: &'a [NormalizedTransaction],
    pub(crate) catalog: &'a [CatalogEntry],
    pub(crate) stock: &'a [StockEntry],
}

/// What a load run wrote to the store.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub staff_inserted: u64,
    pub products_upserted: u64,
    pub ingredients_upserted: u64,
    pub stock_movements_inserted: u64,
    pub sales_loaded: u64,
    pub sales_skipped: u64,
    /// Total sale amount of the loaded sales.
    pub revenue: Amount,
    /// Total profit of the loaded sales.
    pub profit: Amount,
}

impl Display for LoadReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loaded {} sales ({} skipped), revenue {}, profit {}",
            self.sales_loaded,
            self.sales_skipped,
            self.revenue.grouped(),
            self.profit.grouped(),
        )
    }
}

/// A name-to-id map scoped to one load run.
#[derive(Debug, Default)]
struct IdCache {
    ids: HashMap<String, i64>,
}

impl IdCache {
    fn new(ids: HashMap<String, i64>) -> Self {
        Self { ids }
    }

    fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    fn refresh(&mut self, ids: HashMap<String, i64>) {
        self.ids = ids;
    }
}

/// Writes `batch` to `db`. Store errors abort the run; sales whose product is not in the store
/// are skipped with a warning.
pub(crate) async fn load(db: &Db, batch: LoadBatch<'_>) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    // Staff
    let names: BTreeSet<&str> = batch
        .sales
        .iter()
        .map(|sale| sale.staff_name().trim())
        .filter(|name| !name.is_empty())
        .collect();
    let names: Vec<&str> = names.into_iter().collect();
    report.staff_inserted = db
        .insert_staff(&names)
        .await
        .context("Failed to load staff")?;
    let mut staff = IdCache::new(db.staff_ids().await?);
    debug!("Staff: {} new of {} seen", report.staff_inserted, names.len());

    // Products
    report.products_upserted = db
        .upsert_products(batch.catalog)
        .await
        .context("Failed to load products")?;
    let products = IdCache::new(db.product_ids().await?);
    debug!("Products: {} upserted", report.products_upserted);

    // Ingredients and their initial stock movements
    report.ingredients_upserted = db
        .upsert_ingredients(batch.stock)
        .await
        .context("Failed to load ingredients")?;
    report.stock_movements_inserted = db
        .insert_stock_movements(batch.stock)
        .await
        .context("Failed to load stock movements")?;
    debug!(
        "Ingredients: {} upserted, {} stock movements inserted",
        report.ingredients_upserted, report.stock_movements_inserted
    );

    // Sales
    let mut facts = Vec::with_capacity(batch.sales.len());
    for sale in batch.sales {
        let staff_id = resolve_staff(db, &mut staff, sale.staff_name()).await?;

        let Some(product_id) = products.get(sale.standardized_name()) else {
            warn!(
                "Skipping sale {}: product '{}' is not in the store",
                sale.transaction_id(),
                sale.standardized_name()
            );
            report.sales_skipped += 1;
            continue;
        };

        facts.push(SaleFact {
            sale,
            product_id,
            staff_id,
        });
    }

    report.sales_loaded = db
        .upsert_sales(&facts)
        .await
        .context("Failed to load sales")?;
    report.revenue = facts.iter().map(|f| f.sale.total_sale()).sum();
    report.profit = facts.iter().map(|f| f.sale.total_profit()).sum();

    info!("Load complete: {report}");
    Ok(report)
}

/// Returns the store id of `name`. A name missing from `cache` is inserted and the cache is
/// reloaded from the store before looking it up again.
async fn resolve_staff(db: &Db, cache: &mut IdCache, name: &str) -> Result<i64> {
    let name = name.trim();
    ensure!(!name.is_empty(), "A sale has a blank staff name");
    if let Some(id) = cache.get(name) {
        return Ok(id);
    }
    debug!("Staff member '{name}' is not cached, inserting");
    db.insert_staff(&[name])
        .await
        .context("Failed to load staff")?;
    cache.refresh(db.staff_ids().await?);
    cache
        .get(name)
        .with_context(|| format!("Staff member '{name}' is missing after insert"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogIndex, RawTransaction};
    use crate::test::TestEnv;
    use crate::transform::{AliasRules, Normalizer};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(id: i64, name: &str, qty: i64, price: &str, staff: &str) -> RawTransaction {
        RawTransaction {
            transaction_id: id,
            date: NaiveDate::from_ymd_opt(2024, 1, 5),
            product_name: Some(name.to_string()),
            quantity: qty,
            unit_price: Some(dec(price)),
            payment_method: Some("cash".to_string()),
            staff_name: Some(staff.to_string()),
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                product_id: 10,
                name: "Капучино".to_string(),
                category: Some("Coffee".to_string()),
                standard_price: dec("45.00"),
                unit_cost: Some(dec("20.00")),
            },
            CatalogEntry {
                product_id: 11,
                name: "Лате".to_string(),
                category: Some("Coffee".to_string()),
                standard_price: dec("50.00"),
                unit_cost: Some(dec("22.00")),
            },
        ]
    }

    fn normalize(catalog: &[CatalogEntry], raws: &[RawTransaction]) -> Vec<NormalizedTransaction> {
        let index = CatalogIndex::new(catalog).unwrap();
        let aliases = AliasRules::default();
        Normalizer::new(&index, &aliases).normalize_all(raws).records
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let catalog = catalog();
        let sales = normalize(&catalog, &[raw(1, "Капучино", 2, "45.00", "Olena")]);

        let report = load(
            &db,
            LoadBatch {
                sales: &sales,
                catalog: &catalog,
                stock: &[],
            },
        )
        .await
        .unwrap();

        assert_eq!(report.staff_inserted, 1);
        assert_eq!(report.products_upserted, 2);
        assert_eq!(report.sales_loaded, 1);
        assert_eq!(report.sales_skipped, 0);
        assert_eq!(report.revenue.to_string(), "90.00");
        assert_eq!(report.profit.to_string(), "50.00");

        let olena = *db.staff_ids().await.unwrap().get("Olena").unwrap();
        let row = db.sale_row(1).await.unwrap().unwrap();
        assert_eq!(row.product_id, 10);
        assert_eq!(row.staff_id, olena);
        assert_eq!(row.sale_date, "2024-01-05");
        assert_eq!(row.unit_price, "45.00");
        assert_eq!(row.total_sale, "90.00");
        assert_eq!(row.profit_per_unit, "25.00");
        assert_eq!(row.total_profit, "50.00");
        assert_eq!(row.payment_method, "cash");
    }

    #[tokio::test]
    async fn test_loading_twice_is_idempotent_for_sales() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let catalog = catalog();
        let sales = normalize(
            &catalog,
            &[
                raw(1, "Капучино", 2, "45.00", "Olena"),
                raw(2, "латте", 1, "50.00", "Ivan"),
            ],
        );
        let batch = LoadBatch {
            sales: &sales,
            catalog: &catalog,
            stock: &[],
        };

        load(&db, batch).await.unwrap();
        let first = (db.sale_row(1).await.unwrap(), db.sale_row(2).await.unwrap());
        let second_report = load(&db, batch).await.unwrap();

        assert_eq!(second_report.staff_inserted, 0);
        assert_eq!(db.count_rows("sales").await.unwrap(), 2);
        assert_eq!(db.count_rows("staff").await.unwrap(), 2);
        assert_eq!(
            first,
            (db.sale_row(1).await.unwrap(), db.sale_row(2).await.unwrap())
        );
    }

    #[tokio::test]
    async fn test_unknown_product_is_skipped() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let catalog = catalog();
        let sales = normalize(
            &catalog,
            &[
                raw(1, "Mystery Drink", 1, "30.00", "Olena"),
                raw(2, "Лате", 1, "50.00", "Olena"),
            ],
        );
        assert_eq!(sales[0].standardized_name(), "Unknown / Mystery Drink");
        assert_eq!(sales[0].total_profit().to_string(), "0.00");

        let report = load(
            &db,
            LoadBatch {
                sales: &sales,
                catalog: &catalog,
                stock: &[],
            },
        )
        .await
        .unwrap();

        assert_eq!(report.sales_loaded, 1);
        assert_eq!(report.sales_skipped, 1);
        assert!(db.sale_row(1).await.unwrap().is_none());
        assert_eq!(db.sale_row(2).await.unwrap().unwrap().product_id, 11);
    }

    #[tokio::test]
    async fn test_stock_is_loaded_once_per_restock() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let stock = vec![StockEntry {
            ingredient_id: 1,
            name: "Молоко".to_string(),
            quantity_on_hand: dec("12.5"),
            unit_cost: Some(dec("32.00")),
            last_restock: NaiveDate::from_ymd_opt(2024, 1, 3),
            unit_of_measure: None,
        }];
        let batch = LoadBatch {
            sales: &[],
            catalog: &[],
            stock: &stock,
        };

        let first = load(&db, batch).await.unwrap();
        let second = load(&db, batch).await.unwrap();
        assert_eq!(first.ingredients_upserted, 1);
        assert_eq!(first.stock_movements_inserted, 1);
        assert_eq!(second.stock_movements_inserted, 0);
        assert_eq!(db.count_rows("stock_movements").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_top_sellers_after_load() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let catalog = catalog();
        let sales = normalize(
            &catalog,
            &[
                raw(1, "Капучино", 2, "45.00", "Olena"),
                raw(2, "Лате", 3, "50.00", "Ivan"),
                raw(3, "Капучино", 1, "45.00", "Ivan"),
            ],
        );
        load(
            &db,
            LoadBatch {
                sales: &sales,
                catalog: &catalog,
                stock: &[],
            },
        )
        .await
        .unwrap();

        let top = db.top_selling_items(5).await.unwrap();
        assert_eq!(top.len(), 2);
        // equal quantities are ordered by name
        assert_eq!(top[0].name, "Капучино");
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[1].name, "Лате");
        assert_eq!(top[1].quantity, 3);

        let top_one = db.top_selling_items(1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_staff_inserts_uncached_name() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        db.insert_staff(&["Olena"]).await.unwrap();
        let mut cache = IdCache::new(db.staff_ids().await.unwrap());
        assert_eq!(cache.get("Mykola"), None);

        let id = resolve_staff(&db, &mut cache, " Mykola ").await.unwrap();

        assert_eq!(cache.get("Mykola"), Some(id));
        assert!(cache.get("Olena").is_some());
        assert_eq!(db.staff_ids().await.unwrap().get("Mykola"), Some(&id));
        assert_eq!(db.count_rows("staff").await.unwrap(), 2);

        // a cached name does not touch the store
        assert_eq!(resolve_staff(&db, &mut cache, "Mykola").await.unwrap(), id);
        assert_eq!(db.count_rows("staff").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_resolve_staff_rejects_blank_name() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let mut cache = IdCache::default();
        assert!(resolve_staff(&db, &mut cache, "   ").await.is_err());
        assert_eq!(db.count_rows("staff").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reloading_a_sale_overwrites_it() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let catalog = catalog();
        let first = normalize(&catalog, &[raw(1, "Капучино", 2, "45.00", "Olena")]);
        let changed = normalize(&catalog, &[raw(1, "Лате", 4, "50.005", "Ivan")]);

        for sales in [&first, &changed] {
            load(
                &db,
                LoadBatch {
                    sales,
                    catalog: &catalog,
                    stock: &[],
                },
            )
            .await
            .unwrap();
        }

        let ivan = *db.staff_ids().await.unwrap().get("Ivan").unwrap();
        let row = db.sale_row(1).await.unwrap().unwrap();
        assert_eq!(db.count_rows("sales").await.unwrap(), 1);
        assert_eq!(row.product_id, 11);
        assert_eq!(row.staff_id, ivan);
        assert_eq!(row.quantity, 4);
        assert_eq!(row.unit_price, "50.005");
        assert_eq!(row.total_sale, "200.02");
        assert_eq!(row.profit_per_unit, "28.01");
        assert_eq!(row.total_profit, "112.04");
    }

    #[test]
    fn test_id_cache() {
        let mut cache = IdCache::default();
        assert_eq!(cache.get("Olena"), None);
        cache.refresh(HashMap::from([("Olena".to_string(), 4)]));
        assert_eq!(cache.get("Olena"), Some(4));
    }

    #[test]
    fn test_report_display() {
        let report = LoadReport {
            sales_loaded: 3,
            sales_skipped: 1,
            revenue: Amount::new(dec("1234.5")),
            profit: Amount::new(dec("600")),
            ..LoadReport::default()
        };
        assert_eq!(
            report.to_string(),
            "loaded 3 sales (1 skipped), revenue 1,234.50, profit 600.00"
        );
    }
}
