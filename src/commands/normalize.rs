use crate::args::NormalizeArgs;
use crate::commands::{input_path, prepare, Out};
use crate::model::NormalizedTransaction;
use crate::{input, Config, Result};
use serde::{Deserialize, Serialize};

/// The result of a dry run: stage counts and the records that would be loaded.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub sales_read: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub after_dedupe: usize,
    pub unmatched: usize,
    pub records: Vec<NormalizedTransaction>,
}

/// Reads the sales and catalog inputs and runs them through normalization and deduplication
/// without writing anything to the store.
pub async fn normalize(config: Config, args: NormalizeArgs) -> Result<Out<Normalization>> {
    let sales_path = input_path(args.sales(), config.sales_file());
    let catalog_path = input_path(args.catalog(), config.catalog_file());

    let raw_sales = input::read_sales(&sales_path);
    let catalog = input::read_catalog(&catalog_path);
    let prepared = prepare(&raw_sales, &catalog, config.aliases())?;

    let unmatched = prepared.sales.iter().filter(|s| !s.is_matched()).count();
    let result = Normalization {
        sales_read: raw_sales.len(),
        normalized: prepared.normalized,
        rejected: prepared.rejected,
        after_dedupe: prepared.sales.len(),
        unmatched,
        records: prepared.sales,
    };
    let message = format!(
        "Read {} sales, {} normalized ({} without a catalog match), {} rejected, {} after dedupe",
        result.sales_read, result.normalized, result.unmatched, result.rejected, result.after_dedupe
    );
    Ok(Out::new(message, result))
}
