use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// Represents a single row from the product catalog (menu) sheet.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogEntry {
    /// External product id, used as the primary key of the products table.
    pub product_id: i64,
    /// The standardized product name. This is the join key between sales text and the catalog.
    pub name: String,
    pub category: Option<String>,
    pub standard_price: Decimal,
    /// `None` means the profit of a sale of this product cannot be computed.
    pub unit_cost: Option<Decimal>,
}

/// The lookup key form of a product name: lower-cased and trimmed.
pub fn catalog_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Raised when two catalog entries normalize to the same lookup key.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CatalogError {
    DuplicateKey {
        key: String,
        first_id: i64,
        second_id: i64,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::DuplicateKey {
                key,
                first_id,
                second_id,
            } => write!(
                f,
                "Catalog products {first_id} and {second_id} share the name key '{key}'"
            ),
        }
    }
}

impl StdError for CatalogError {}

/// A lookup from `catalog_key(name)` to the catalog entry that carries that name.
#[derive(Default, Debug, Clone)]
pub struct CatalogIndex {
    entries: HashMap<String, CatalogEntry>,
}

impl CatalogIndex {
    /// Builds the index. Two entries whose names normalize to the same key are an error; the
    /// index is never built with one of them silently overwriting the other.
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> Result<Self, CatalogError> {
        let mut map: HashMap<String, CatalogEntry> = HashMap::new();
        for entry in entries {
            let key = catalog_key(&entry.name);
            if let Some(existing) = map.get(&key) {
                return Err(CatalogError::DuplicateKey {
                    key,
                    first_id: existing.product_id,
                    second_id: entry.product_id,
                });
            }
            map.insert(key, entry.clone());
        }
        Ok(Self { entries: map })
    }

    /// Looks up an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry {
            product_id: id,
            name: name.to_string(),
            category: Some("Coffee".to_string()),
            standard_price: Decimal::new(4500, 2),
            unit_cost: Some(Decimal::new(2000, 2)),
        }
    }

    #[test]
    fn test_keys_are_case_and_whitespace_insensitive() {
        let entries = vec![entry(10, "Капучино"), entry(11, "Лате")];
        let index = CatalogIndex::new(&entries).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&catalog_key("  КАПУЧИНО ")).unwrap().product_id, 10);
        assert_eq!(index.get("лате").unwrap().product_id, 11);
    }

    #[test]
    fn test_missing_name_is_not_found() {
        let entries = vec![entry(10, "Капучино")];
        let index = CatalogIndex::new(&entries).unwrap();
        assert!(index.get(&catalog_key("Mystery Drink")).is_none());
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        let entries = vec![entry(10, "Espresso"), entry(12, " espresso")];
        let err = CatalogIndex::new(&entries).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateKey {
                key: "espresso".to_string(),
                first_id: 10,
                second_id: 12,
            }
        );
        assert!(err.to_string().contains("'espresso'"));
    }

    #[test]
    fn test_empty_index() {
        let index = CatalogIndex::new(&Vec::<CatalogEntry>::new()).unwrap();
        assert!(index.is_empty());
    }
}
