//! Barcode id to product record lookup.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::builtin;
use crate::error::{CatalogError, Result};
use crate::record::ProductRecord;

/// Immutable map from barcode text to [`ProductRecord`].
///
/// Built once at startup and shared (typically behind an `Arc`) by the
/// ingest stage and the indicator pool. Lookups are `O(1)` and never mutate.
///
/// # Example
///
/// ```
/// use overlay_catalog::ProductCatalog;
///
/// let catalog = ProductCatalog::builtin();
/// let milk = catalog.lookup("1234567890123").unwrap();
/// assert_eq!(milk.name, "Whole Milk");
/// assert!(catalog.lookup("0000000000000").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    records: HashMap<String, ProductRecord>,
}

impl ProductCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in demo catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let records: HashMap<String, ProductRecord> = builtin::records()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { records }
    }

    /// Builds a catalog from records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two records share an id and
    /// [`CatalogError::EmptyId`] for a record without one.
    pub fn from_records(records: impl IntoIterator<Item = ProductRecord>) -> Result<Self> {
        let mut map = HashMap::new();
        for record in records {
            if record.id.is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if map.contains_key(&record.id) {
                return Err(CatalogError::duplicate_id(record.id));
            }
            map.insert(record.id.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// Parses a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, plus the
    /// [`ProductCatalog::from_records`] errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ProductRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Reads and parses a JSON catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus the
    /// [`ProductCatalog::from_json_str`] errors.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let catalog = Self::from_json_str(&json)?;
        info!(path = %path.display(), products = catalog.len(), "Loaded product catalog");
        Ok(catalog)
    }

    /// Looks up a product by barcode text.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&ProductRecord> {
        let found = self.records.get(id);
        if found.is_none() {
            debug!(id, "Barcode not in catalog");
        }
        found
    }

    /// Returns true if `id` is a known product.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{PreferenceSet, PreferenceTag, warnings_for};
    use std::io::Write;

    #[test]
    fn builtin_has_all_products() {
        let catalog = ProductCatalog::builtin();
        assert_eq!(catalog.len(), 21);
        assert!(catalog.contains("5449000000996"));
        let rice = catalog.lookup("4567890123456").unwrap();
        assert_eq!(rice.formatted_price(), "$12.50");
    }

    #[test]
    fn builtin_ingredients_drive_warnings() {
        let catalog = ProductCatalog::builtin();
        let prefs = PreferenceSet::from_tags(PreferenceTag::ALL);
        let noodles = catalog.lookup("8901234567890").unwrap();
        assert_eq!(warnings_for(noodles, &prefs), vec!["Gluten", "Meat"]);
        let water = catalog.lookup("1001223344556").unwrap();
        assert!(warnings_for(water, &prefs).is_empty());
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let err = ProductCatalog::from_records([
            ProductRecord::new("1", "A", 1.0),
            ProductRecord::new("1", "B", 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "1"));
    }

    #[test]
    fn from_records_rejects_empty_id() {
        let err = ProductCatalog::from_records([ProductRecord::new("", "A", 1.0)]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyId));
    }

    #[test]
    fn from_json_str_parses_records() {
        let catalog = ProductCatalog::from_json_str(
            r#"[
                {"id": "111", "name": "Oat Milk", "price": 2.5, "ingredients": ["oats", "water"]},
                {"id": "222", "name": "Brie", "price": 6.0, "manufacturer": "Fromagerie"}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("222").unwrap().manufacturer, "Fromagerie");
    }

    #[test]
    fn from_json_str_malformed() {
        let err = ProductCatalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn from_json_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "9", "name": "Tea", "price": 3.0}}]"#).unwrap();
        let catalog = ProductCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.lookup("9").unwrap().name, "Tea");
    }

    #[test]
    fn from_json_file_missing() {
        let err = ProductCatalog::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
