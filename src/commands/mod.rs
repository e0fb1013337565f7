//! Command handlers for the pos CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod load;
mod normalize;
mod top;

use crate::model::{CatalogEntry, CatalogIndex, NormalizedTransaction, RawTransaction};
use crate::transform::{dedupe, AliasRules, Normalizer};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use init::init;
pub use load::{load, RunSummary};
pub use normalize::{normalize, Normalization};
pub use top::top;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Sales after normalization and deduplication, with the counts from each stage.
struct Prepared {
    normalized: usize,
    rejected: usize,
    sales: Vec<NormalizedTransaction>,
}

/// Runs the transform stages shared by `load` and `normalize`.
fn prepare(
    raw_sales: &[RawTransaction],
    catalog: &[CatalogEntry],
    aliases: &AliasRules,
) -> Result<Prepared> {
    let index = CatalogIndex::new(catalog).context("The product catalog is invalid")?;
    if index.is_empty() {
        warn!("The product catalog is empty, no sale will match a product");
    } else {
        debug!("Indexed {} catalog products", index.len());
    }
    let normalized = Normalizer::new(&index, aliases).normalize_all(raw_sales);
    let count = normalized.records.len();
    let sales = dedupe(normalized.records);
    info!(
        "Processed sales records after cleaning and transformation: {}",
        sales.len()
    );
    Ok(Prepared {
        normalized: count,
        rejected: normalized.rejected,
        sales,
    })
}

/// Returns the command line override if given, otherwise the configured path.
fn input_path(flag: Option<&Path>, configured: PathBuf) -> PathBuf {
    flag.map(Path::to_path_buf).unwrap_or(configured)
}
