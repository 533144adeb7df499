//! Error types for the overlay pipeline.
//!
//! Only construction can fail. Once running, the pipeline absorbs bad input
//! (malformed payloads, missing poses, unknown products) and logs it.

use std::path::PathBuf;

use overlay_catalog::CatalogError;
use sensor_fusion::FusionError;
use sensor_types::SensorError;
use thiserror::Error;

/// Errors raised while configuring or building the overlay.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config JSON is malformed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Camera model error.
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// Pose history error.
    #[error(transparent)]
    Fusion(#[from] FusionError),

    /// Product catalog error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl OverlayError {
    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for overlay construction.
pub type Result<T> = std::result::Result<T, OverlayError>;
