//! Pose-history errors.

use thiserror::Error;

/// Why a pose could not be recorded or resolved.
///
/// All times are seconds on the capture clock.
#[derive(Debug, Error)]
pub enum FusionError {
    /// Nothing buffered to answer from.
    #[error("no samples: {0}")]
    NoSamples(&'static str),

    /// Query outside the buffered window.
    #[error("{timestamp}s is outside the buffered window [{min}s, {max}s]")]
    OutsideWindow {
        /// The query time.
        timestamp: f64,
        /// Oldest buffered time.
        min: f64,
        /// Newest buffered time.
        max: f64,
    },

    /// Sample recorded after a newer one.
    #[error("sample at {timestamp}s is older than the latest at {latest}s")]
    OutOfOrder {
        /// The rejected time.
        timestamp: f64,
        /// Newest buffered time.
        latest: f64,
    },

    /// Sample time is `NaN` or infinite.
    #[error("sample time {0} is not finite")]
    NonFiniteTimestamp(f64),

    /// Rejected setting.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FusionError {
    /// Creates an outside-window error.
    #[must_use]
    pub const fn outside_window(timestamp: f64, min: f64, max: f64) -> Self {
        Self::OutsideWindow {
            timestamp,
            min,
            max,
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for pose-history operations.
pub type Result<T> = std::result::Result<T, FusionError>;
