//! This module is responsible for reading, writing and managing the SQLite sales store.
//!
//! Every write method runs its whole group of rows inside one transaction. A failing statement
//! rolls the group back and the error is returned to the caller; there is no per-row retry.

mod schema;

use crate::model::{
    round2, CatalogEntry, NormalizedTransaction, StockEntry, INITIAL_STOCK_REASON, MONEY_SCALE,
};
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

/// A normalized sale whose staff and product references have been resolved to store ids.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SaleFact<'a> {
    pub(crate) sale: &'a NormalizedTransaction,
    pub(crate) product_id: i64,
    pub(crate) staff_id: i64,
}

/// A product and the total quantity sold, as returned by [`Db::top_selling_items`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TopSeller {
    pub name: String,
    pub quantity: i64,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite connection pool
    /// - Checks that the schema is the one this program writes
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The SQLite database is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        schema::verify(&pool).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Creates the schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        schema::create(&pool).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    /// Inserts each staff name that is not already stored. Returns the number of new rows.
    pub(crate) async fn insert_staff(&self, names: &[&str]) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin staff load")?;
        let mut inserted = 0;
        for name in names {
            inserted += sqlx::query("INSERT INTO staff (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
                .bind(*name)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert staff member '{name}'"))?
                .rows_affected();
        }
        tx.commit().await.context("Failed to commit staff load")?;
        Ok(inserted)
    }

    /// Returns every stored staff member as a map from name to id.
    pub(crate) async fn staff_ids(&self) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, id FROM staff")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read staff ids")?;
        Ok(rows.into_iter().collect())
    }

    /// Inserts or overwrites products keyed by their external product id.
    pub(crate) async fn upsert_products(&self, entries: &[CatalogEntry]) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin product load")?;
        let mut upserted = 0;
        for entry in entries {
            upserted += sqlx::query(
                r#"INSERT INTO products (product_id, name, category, standard_price, unit_cost)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (product_id) DO UPDATE SET
                    name = excluded.name,
                    category = excluded.category,
                    standard_price = excluded.standard_price,
                    unit_cost = excluded.unit_cost"#,
            )
            .bind(entry.product_id)
            .bind(&entry.name)
            .bind(entry.category.as_deref())
            .bind(money(entry.standard_price))
            .bind(entry.unit_cost.map(money))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert product {}", entry.product_id))?
            .rows_affected();
        }
        tx.commit().await.context("Failed to commit product load")?;
        Ok(upserted)
    }

    /// Returns every stored product as a map from name to product id.
    pub(crate) async fn product_ids(&self) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, product_id FROM products")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read product ids")?;
        Ok(rows.into_iter().collect())
    }

    /// Inserts or overwrites ingredients keyed by their external ingredient id.
    pub(crate) async fn upsert_ingredients(&self, entries: &[StockEntry]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin ingredient load")?;
        let mut upserted = 0;
        for entry in entries {
            upserted += sqlx::query(
                r#"INSERT INTO ingredients
                    (ingredient_id, name, quantity_on_hand, unit_cost, last_restock)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (ingredient_id) DO UPDATE SET
                    name = excluded.name,
                    quantity_on_hand = excluded.quantity_on_hand,
                    unit_cost = excluded.unit_cost,
                    last_restock = excluded.last_restock"#,
            )
            .bind(entry.ingredient_id)
            .bind(&entry.name)
            .bind(entry.quantity_on_hand.normalize().to_string())
            .bind(entry.unit_cost.map(money))
            .bind(entry.last_restock.map(|d| d.to_string()))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert ingredient {}", entry.ingredient_id))?
            .rows_affected();
        }
        tx.commit()
            .await
            .context("Failed to commit ingredient load")?;
        Ok(upserted)
    }

    /// Records the on-hand quantity of every ingredient with a known restock date as an initial
    /// stock movement. A movement for the same ingredient, date and reason is only stored once.
    pub(crate) async fn insert_stock_movements(&self, entries: &[StockEntry]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin stock movement load")?;
        let mut inserted = 0;
        for entry in entries {
            let Some(restocked) = entry.last_restock else {
                continue;
            };
            inserted += sqlx::query(
                r#"INSERT INTO stock_movements
                    (ingredient_id, movement_date, quantity_change, reason, unit_of_measure)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (ingredient_id, movement_date, reason) DO NOTHING"#,
            )
            .bind(entry.ingredient_id)
            .bind(restocked.to_string())
            .bind(entry.quantity_on_hand.normalize().to_string())
            .bind(INITIAL_STOCK_REASON)
            .bind(entry.unit())
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "Failed to insert stock movement for ingredient {}",
                    entry.ingredient_id
                )
            })?
            .rows_affected();
        }
        tx.commit()
            .await
            .context("Failed to commit stock movement load")?;
        Ok(inserted)
    }

    /// Inserts or overwrites sales keyed by their transaction id.
    pub(crate) async fn upsert_sales(&self, facts: &[SaleFact<'_>]) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin sales load")?;
        let mut upserted = 0;
        for fact in facts {
            let sale = fact.sale;
            upserted += sqlx::query(
                r#"INSERT INTO sales (
                    transaction_id, sale_date, product_id, staff_id, quantity, unit_price,
                    total_sale, profit_per_unit, total_profit, payment_method
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (transaction_id) DO UPDATE SET
                    sale_date = excluded.sale_date,
                    product_id = excluded.product_id,
                    staff_id = excluded.staff_id,
                    quantity = excluded.quantity,
                    unit_price = excluded.unit_price,
                    total_sale = excluded.total_sale,
                    profit_per_unit = excluded.profit_per_unit,
                    total_profit = excluded.total_profit,
                    payment_method = excluded.payment_method"#,
            )
            .bind(sale.transaction_id())
            .bind(sale.date().to_string())
            .bind(fact.product_id)
            .bind(fact.staff_id)
            .bind(sale.quantity())
            .bind(exact_money(sale.unit_price().value()))
            .bind(sale.total_sale().to_string())
            .bind(sale.profit_per_unit().to_string())
            .bind(sale.total_profit().to_string())
            .bind(sale.payment_method())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert sale {}", sale.transaction_id()))?
            .rows_affected();
        }
        tx.commit().await.context("Failed to commit sales load")?;
        Ok(upserted)
    }

    /// Returns up to `limit` products ordered by total quantity sold, highest first. Products with
    /// equal quantities are ordered by name.
    pub(crate) async fn top_selling_items(&self, limit: u32) -> Result<Vec<TopSeller>> {
        if limit == 0 {
            bail!("The top sellers limit must be at least 1");
        }
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"SELECT p.name, SUM(s.quantity) AS total
            FROM sales s
            JOIN products p ON p.product_id = s.product_id
            GROUP BY p.name
            ORDER BY total DESC, p.name ASC
            LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query top selling items")?;

        Ok(rows
            .into_iter()
            .map(|(name, quantity)| TopSeller { name, quantity })
            .collect())
    }
}

/// Renders a money value with exactly two fractional digits for storage.
fn money(value: rust_decimal::Decimal) -> String {
    round2(value).to_string()
}

/// Renders an input money value without rounding, padded to at least two fractional digits.
fn exact_money(mut value: rust_decimal::Decimal) -> String {
    if value.scale() < MONEY_SCALE {
        value.rescale(MONEY_SCALE);
    }
    value.to_string()
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create)
        .foreign_keys(true);

    // One connection keeps the store single-writer.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

#[cfg(test)]
impl Db {
    /// Returns the number of rows in `table`.
    pub(crate) async fn count_rows(&self, table: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count rows in {table}"))?;
        Ok(row.0)
    }

    /// Returns the stored columns of one sale as text, in table order, or `None` if it is absent.
    pub(crate) async fn sale_row(&self, transaction_id: i64) -> Result<Option<StoredSale>> {
        sqlx::query_as(
            r#"SELECT transaction_id, sale_date, product_id, staff_id, quantity, unit_price,
                total_sale, profit_per_unit, total_profit, payment_method
            FROM sales WHERE transaction_id = ?"#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read sale")
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Eq, PartialEq, sqlx::FromRow)]
pub(crate) struct StoredSale {
    pub(crate) transaction_id: i64,
    pub(crate) sale_date: String,
    pub(crate) product_id: i64,
    pub(crate) staff_id: i64,
    pub(crate) quantity: i64,
    pub(crate) unit_price: String,
    pub(crate) total_sale: String,
    pub(crate) profit_per_unit: String,
    pub(crate) total_profit: String,
    pub(crate) payment_method: String,
}
