//! Product records.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything the overlay knows about one product.
///
/// Records are immutable once loaded. The catalog owns them; every other
/// stage borrows.
///
/// # Example
///
/// ```
/// use overlay_catalog::ProductRecord;
///
/// let milk = ProductRecord::new("1234567890123", "Whole Milk", 3.49)
///     .with_manufacturer("DairyFresh Inc.")
///     .with_dates("2025-01-10", "2025-03-10")
///     .with_ingredients(["milk"]);
///
/// assert_eq!(
///     milk.to_string(),
///     "Whole Milk\n$3.49\nBy: DairyFresh Inc.\nExp: 2025-03-10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Barcode text this record is keyed by.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Shelf price in the store's currency.
    pub price: f64,
    /// Manufacturer or brand.
    #[serde(default)]
    pub manufacturer: String,
    /// Manufacture date, as printed.
    #[serde(default)]
    pub manufacture_date: String,
    /// Best-before date, as printed.
    #[serde(default)]
    pub expiry_date: String,
    /// Ingredient tags, lower-case by convention.
    #[serde(default)]
    pub ingredients: BTreeSet<String>,
}

impl ProductRecord {
    /// Creates a record with the required fields; the rest start empty.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            manufacturer: String::new(),
            manufacture_date: String::new(),
            expiry_date: String::new(),
            ingredients: BTreeSet::new(),
        }
    }

    /// Sets the manufacturer.
    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Sets manufacture and expiry dates.
    #[must_use]
    pub fn with_dates(mut self, manufactured: impl Into<String>, expires: impl Into<String>) -> Self {
        self.manufacture_date = manufactured.into();
        self.expiry_date = expires.into();
        self
    }

    /// Replaces the ingredient tags.
    #[must_use]
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Price formatted to two decimals with a currency sign.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// The indicator body: name, price, manufacturer and expiry on separate lines.
impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\nBy: {}\nExp: {}",
            self.name,
            self.formatted_price(),
            self.manufacturer,
            self.expiry_date
        )
    }
}
