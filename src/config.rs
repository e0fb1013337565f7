//! Configuration file handling for pos-sync.
//!
//! The configuration file is stored at `$POS_HOME/config.json` and names the three input files,
//! the number of top sellers to report and, optionally, the product name alias rules. The SQLite
//! store lives next to it at `$POS_HOME/pos.sqlite`.

use crate::db::Db;
use crate::transform::AliasRules;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pos-sync";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const POS_SQLITE: &str = "pos.sqlite";
const DEFAULT_TOP_N: u32 = 5;
const DEFAULT_SALES_FILE: &str = "data/daily_sales.xlsx";
const DEFAULT_CATALOG_FILE: &str = "data/menu_items.xlsx";
const DEFAULT_STOCK_FILE: &str = "data/inventory.xlsx";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$POS_HOME` and from there it loads `$POS_HOME/config.json` and opens the store.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

/// Paths to the three input files. `None` means "use the default".
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct InputPaths {
    pub sales: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub stock: Option<PathBuf>,
}

impl Config {
    /// Creates the home directory, writes an initial `config.json` and creates the SQLite store.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/pos`
    /// - `inputs` - Input file paths to record in the config. Missing ones get default names under
    ///   `data/`.
    ///
    /// # Errors
    /// - Returns an error if any file operation fails or if the store already exists.
    pub async fn create(dir: impl Into<PathBuf>, inputs: &InputPaths) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the pos home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            sales_file: inputs
                .sales
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SALES_FILE)),
            catalog_file: inputs
                .catalog
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE)),
            stock_file: inputs
                .stock
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STOCK_FILE)),
            ..ConfigFile::default()
        };

        // Create the store first so that a second init fails before touching config.json.
        let db_path = root.join(POS_SQLITE);
        let db = Db::init(&db_path)
            .await
            .context("Unable to create SQLite DB")?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    /// This will
    /// - validate that `pos_home` exists and that the config file exists
    /// - load and validate the config file
    /// - open the store, migrating its schema if needed
    pub async fn load(pos_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = pos_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The pos home directory is missing")?;

        // Validate that the home directory is readable.
        let _ = utils::read_dir(&root)
            .await
            .context("The pos home directory is not readable")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let db_path = root.join(POS_SQLITE);
        let db = Db::load(&db_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn sales_file(&self) -> PathBuf {
        self.resolve(&self.config_file.sales_file)
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.resolve(&self.config_file.catalog_file)
    }

    pub fn stock_file(&self) -> PathBuf {
        self.resolve(&self.config_file.stock_file)
    }

    pub fn top_n(&self) -> u32 {
        self.config_file.top_n
    }

    pub fn aliases(&self) -> &AliasRules {
        &self.config_file.aliases
    }

    /// Checks if `p` is relative, and if so, resolves it against the home directory.
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pos-sync",
///   "config_version": 1,
///   "sales_file": "data/daily_sales.xlsx",
///   "catalog_file": "data/menu_items.xlsx",
///   "stock_file": "/srv/exports/inventory.csv",
///   "top_n": 5,
///   "aliases": [
///     { "contains": "латте", "canonical": "лате" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pos-sync"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Sales export, relative to the home directory or absolute
    sales_file: PathBuf,

    /// Product catalog, relative to the home directory or absolute
    catalog_file: PathBuf,

    /// Ingredient stock, relative to the home directory or absolute
    stock_file: PathBuf,

    /// Number of top sellers reported after a load
    #[serde(default = "default_top_n")]
    top_n: u32,

    /// Ordered product name alias rules. The built-in rules are used when this is absent.
    #[serde(default)]
    aliases: AliasRules,
}

fn default_top_n() -> u32 {
    DEFAULT_TOP_N
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sales_file: PathBuf::from(DEFAULT_SALES_FILE),
            catalog_file: PathBuf::from(DEFAULT_CATALOG_FILE),
            stock_file: PathBuf::from(DEFAULT_STOCK_FILE),
            top_n: DEFAULT_TOP_N,
            aliases: AliasRules::default(),
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it fails validation.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );
        ensure!(config.top_n >= 1, "top_n in the config file must be at least 1");

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pos_home");
        let inputs = InputPaths {
            sales: Some(PathBuf::from("/srv/exports/sales.csv")),
            ..InputPaths::default()
        };

        let created = Config::create(&home, &inputs).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.sqlite_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.sales_file(), PathBuf::from("/srv/exports/sales.csv"));
        assert_eq!(
            loaded.catalog_file(),
            loaded.root().join("data").join("menu_items.xlsx")
        );
        assert_eq!(loaded.top_n(), 5);
        assert_eq!(loaded.aliases(), &AliasRules::default());
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), &InputPaths::default())
            .await
            .unwrap();
        assert!(Config::create(dir.path(), &InputPaths::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
        // a home without config.json
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let original = ConfigFile {
            top_n: 3,
            aliases: AliasRules::new([crate::transform::AliasRule::new("flat white", "флет вайт")]),
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "pos-sync",
            "config_version": 1,
            "sales_file": "sales.csv",
            "catalog_file": "catalog.csv",
            "stock_file": "stock.csv"
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.aliases, AliasRules::default());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let wrong_app = r#"{
            "app_name": "coffee-pos",
            "config_version": 1,
            "sales_file": "a", "catalog_file": "b", "stock_file": "c"
        }"#;
        utils::write(&path, wrong_app).await.unwrap();
        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));

        let zero_top = r#"{
            "app_name": "pos-sync",
            "config_version": 1,
            "sales_file": "a", "catalog_file": "b", "stock_file": "c",
            "top_n": 0
        }"#;
        utils::write(&path, zero_top).await.unwrap();
        assert!(ConfigFile::load(&path).await.is_err());
    }
}
