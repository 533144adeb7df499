//! Error types for catalog loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`ProductCatalog`](crate::ProductCatalog).
///
/// Lookups never fail with an error; a miss is simply `None`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog JSON is malformed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records share the same barcode id.
    #[error("duplicate product id: {0}")]
    DuplicateId(String),

    /// A record has an empty barcode id.
    #[error("product record has an empty id")]
    EmptyId,
}

impl CatalogError {
    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a duplicate id error.
    #[must_use]
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId(id.into())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_duplicate_id() {
        let err = CatalogError::duplicate_id("1234567890123");
        assert!(err.to_string().contains("duplicate product id"));
        assert!(err.to_string().contains("1234567890123"));
    }

    #[test]
    fn error_io_mentions_path() {
        let err = CatalogError::io(
            "/nope/catalog.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nope/catalog.json"));
    }
}
