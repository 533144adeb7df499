//! Product catalog for the barcode overlay.
//!
//! - [`ProductCatalog`] - immutable barcode id to [`ProductRecord`] map with
//!   `O(1)` [`lookup`](ProductCatalog::lookup)
//! - [`PreferenceTag`] / [`PreferenceSet`] - viewer dietary restrictions
//! - [`warnings_for`] - which enabled restrictions a product implicates
//!
//! The catalog is populated at startup, either from the compiled-in table
//! ([`ProductCatalog::builtin`]) or a JSON file, and never changes after.
//!
//! # Example
//!
//! ```
//! use overlay_catalog::{warnings_for, PreferenceSet, PreferenceTag, ProductCatalog};
//!
//! let catalog = ProductCatalog::builtin();
//! let butter = catalog.lookup("6789012345678").unwrap();
//!
//! let prefs = PreferenceSet::from_tags([PreferenceTag::Lactose]);
//! assert_eq!(warnings_for(butter, &prefs), vec!["Lactose".to_string()]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod builtin;
mod catalog;
mod error;
mod preference;
mod record;

pub use catalog::ProductCatalog;
pub use error::{CatalogError, Result};
pub use preference::{PreferenceSet, PreferenceTag, warnings_for};
pub use record::ProductRecord;
