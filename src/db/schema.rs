//! The sales store schema.
//!
//! The whole schema lives in `schema.sql` and is created in one transaction along with the
//! `schema_version` row. An existing store is only opened if it carries the expected version and
//! all of its tables.

use crate::Result;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

/// The schema version written by `create` and required by `verify`.
pub(super) const VERSION: i32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables created by `schema.sql`, in dependency order.
const TABLES: &[&str] = &["staff", "products", "ingredients", "stock_movements", "sales"];

/// Creates `schema_version` and every table in a single transaction.
pub(super) async fn create(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin schema transaction")?;

    sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
        .execute(&mut *tx)
        .await
        .context("Failed to create schema_version table")?;
    tx.execute(SCHEMA_SQL)
        .await
        .context("Failed to create the store tables")?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(VERSION)
        .execute(&mut *tx)
        .await
        .context("Failed to record the schema version")?;

    tx.commit()
        .await
        .context("Failed to commit schema transaction")?;
    debug!("Created store schema version {VERSION}");
    Ok(())
}

/// Returns the version recorded in `schema_version`.
pub(super) async fn version(pool: &SqlitePool) -> Result<i32> {
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    row.0.context("The schema_version table is empty")
}

/// Fails unless the store was created by this version of the program and still has every table.
pub(super) async fn verify(pool: &SqlitePool) -> Result<()> {
    let found = version(pool).await?;
    if found != VERSION {
        bail!("The database schema version is {found} but this program requires {VERSION}");
    }
    for table in TABLES {
        if !table_exists(pool, table).await? {
            bail!("The database is missing the '{table}' table");
        }
    }
    Ok(())
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await
            .with_context(|| format!("Failed to look up table '{table}'"))?;
    Ok(row.0 > 0)
}
