//! These structs provide the CLI interface for the pos CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pos: A command-line tool for loading point-of-sale exports into a relational store.
///
/// The program reads a shop's daily sales, its menu catalog and its ingredient stock from
/// spreadsheet or CSV exports. Sales are validated, product names are matched against the
/// catalog, and totals and profits are computed. Everything is then loaded into a local SQLite
/// database, after which the best-selling products are reported.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, its config.json and the SQLite database.
    ///
    /// Input file paths may be given now or edited in config.json later. Relative paths are
    /// resolved against --pos-home. By default they are data/daily_sales.xlsx,
    /// data/menu_items.xlsx and data/inventory.xlsx.
    Init(InitArgs),
    /// Read, normalize and load the inputs, then report the top sellers.
    Load(LoadArgs),
    /// Read and normalize the sales without touching the database.
    Normalize(NormalizeArgs),
    /// Report the best-selling products already in the database.
    Top(TopArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where pos data and configuration is held. Defaults to ~/pos
    #[arg(long, env = "POS_HOME", default_value_t = default_pos_home())]
    pos_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, pos_home: PathBuf) -> Self {
        Self {
            log_level,
            pos_home: pos_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn pos_home(&self) -> &DisplayPath {
        &self.pos_home
    }
}

/// Input file overrides shared by the commands that read files.
#[derive(Debug, Default, Parser, Clone)]
pub struct InputArgs {
    /// The daily sales export (.csv, .xlsx, .xls, .xlsb or .ods)
    #[arg(long)]
    sales: Option<PathBuf>,

    /// The menu catalog export
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// The ingredient stock export
    #[arg(long)]
    stock: Option<PathBuf>,
}

impl InputArgs {
    pub fn new(sales: Option<PathBuf>, catalog: Option<PathBuf>, stock: Option<PathBuf>) -> Self {
        Self {
            sales,
            catalog,
            stock,
        }
    }

    pub fn sales(&self) -> Option<&Path> {
        self.sales.as_deref()
    }

    pub fn catalog(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }

    pub fn stock(&self) -> Option<&Path> {
        self.stock.as_deref()
    }
}

/// (Not shown): Args for the `pos init` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct InitArgs {
    #[clap(flatten)]
    inputs: InputArgs,
}

impl InitArgs {
    pub fn new(inputs: InputArgs) -> Self {
        Self { inputs }
    }

    pub fn inputs(&self) -> &InputArgs {
        &self.inputs
    }
}

/// (Not shown): Args for the `pos load` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct LoadArgs {
    #[clap(flatten)]
    inputs: InputArgs,

    /// How many top sellers to report. Defaults to top_n from config.json
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    top: Option<u32>,
}

impl LoadArgs {
    pub fn new(inputs: InputArgs, top: Option<u32>) -> Self {
        Self { inputs, top }
    }

    pub fn inputs(&self) -> &InputArgs {
        &self.inputs
    }

    pub fn top(&self) -> Option<u32> {
        self.top
    }
}

/// (Not shown): Args for the `pos normalize` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct NormalizeArgs {
    /// The daily sales export
    #[arg(long)]
    sales: Option<PathBuf>,

    /// The menu catalog export
    #[arg(long)]
    catalog: Option<PathBuf>,
}

impl NormalizeArgs {
    pub fn new(sales: Option<PathBuf>, catalog: Option<PathBuf>) -> Self {
        Self { sales, catalog }
    }

    pub fn sales(&self) -> Option<&Path> {
        self.sales.as_deref()
    }

    pub fn catalog(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }
}

/// (Not shown): Args for the `pos top` command.
#[derive(Debug, Parser, Clone)]
pub struct TopArgs {
    /// How many products to list. Defaults to top_n from config.json
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,
}

impl TopArgs {
    pub fn new(limit: Option<u32>) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

fn default_pos_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pos"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --pos-home or POS_HOME instead of relying on the default \
                pos home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("pos")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
