use crate::args::LoadArgs;
use crate::commands::top::top_sellers_message;
use crate::commands::{input_path, prepare, Out};
use crate::db::TopSeller;
use crate::loader::{self, LoadBatch, LoadReport};
use crate::{input, Config, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Counts from each stage of a full run, and the top sellers reported at the end.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Sales rows that passed the ingestion checks.
    pub sales_read: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub after_dedupe: usize,
    pub catalog_entries: usize,
    pub stock_entries: usize,
    pub load: LoadReport,
    pub top_sellers: Vec<TopSeller>,
}

/// Reads the three inputs, normalizes and deduplicates the sales, loads everything into the
/// store and reports the top sellers.
///
/// An input file that cannot be read is treated as empty. Errors from the store abort the run.
pub async fn load(config: Config, args: LoadArgs) -> Result<Out<RunSummary>> {
    let sales_path = input_path(args.inputs().sales(), config.sales_file());
    let catalog_path = input_path(args.inputs().catalog(), config.catalog_file());
    let stock_path = input_path(args.inputs().stock(), config.stock_file());

    let raw_sales = input::read_sales(&sales_path);
    let catalog = input::read_catalog(&catalog_path);
    let stock = input::read_stock(&stock_path);
    info!("Raw sales records read: {}", raw_sales.len());
    info!("Menu items read: {}", catalog.len());
    info!("Inventory items read: {}", stock.len());

    let prepared = prepare(&raw_sales, &catalog, config.aliases())?;

    let report = loader::load(
        config.db(),
        LoadBatch {
            sales: &prepared.sales,
            catalog: &catalog,
            stock: &stock,
        },
    )
    .await?;

    let limit = args.top().unwrap_or_else(|| config.top_n());
    let top_sellers = config.db().top_selling_items(limit).await?;
    info!("{}", top_sellers_message(limit, &top_sellers));

    let summary = RunSummary {
        sales_read: raw_sales.len(),
        normalized: prepared.normalized,
        rejected: prepared.rejected,
        after_dedupe: prepared.sales.len(),
        catalog_entries: catalog.len(),
        stock_entries: stock.len(),
        load: report,
        top_sellers,
    };
    let message = format!(
        "Read {} sales, {} normalized, {} rejected, {} after dedupe; {}",
        summary.sales_read,
        summary.normalized,
        summary.rejected,
        summary.after_dedupe,
        summary.load
    );
    Ok(Out::new(message, summary))
}
