//! Error types for sensor operations.

use thiserror::Error;

/// Errors that can occur when working with sensor data.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Camera projection parameters are unusable.
    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    /// A frame with zero width or height.
    #[error("empty frame: {width}x{height}")]
    EmptyFrame {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
}

impl SensorError {
    /// Creates an invalid projection error.
    #[must_use]
    pub fn invalid_projection(reason: impl Into<String>) -> Self {
        Self::InvalidProjection(reason.into())
    }

    /// Creates an empty frame error.
    #[must_use]
    pub const fn empty_frame(width: u32, height: u32) -> Self {
        Self::EmptyFrame { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_projection() {
        let err = SensorError::invalid_projection("near >= far");
        let msg = format!("{err}");
        assert!(msg.contains("invalid projection"));
        assert!(msg.contains("near >= far"));
    }

    #[test]
    fn error_empty_frame() {
        let err = SensorError::empty_frame(0, 480);
        let msg = format!("{err}");
        assert!(msg.contains("0x480"));
    }
}
