use crate::args::InitArgs;
use crate::commands::Out;
use crate::config::InputPaths;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` file that records the input file paths
/// - Creates the SQLite database and its schema
///
/// # Arguments
/// - `pos_home` - The directory that will be the root of data directory, e.g. `$HOME/pos`
/// - `args` - Optional input file paths. Unset ones get default names under `data/`.
///
/// # Errors
/// - Returns an error if any file operations fail or the database already exists.
pub async fn init(pos_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let inputs = InputPaths {
        sales: args.inputs().sales().map(Path::to_path_buf),
        catalog: args.inputs().catalog().map(Path::to_path_buf),
        stock: args.inputs().stock().map(Path::to_path_buf),
    };
    let config = Config::create(pos_home, &inputs)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the pos directory at {}",
        config.root().display()
    )
    .into())
}
