//! Overlay configuration.
//!
//! Every stage takes its settings explicitly at construction. The whole set
//! can be loaded from a JSON file; any field left out keeps its default.
//!
//! ```
//! use barcode_overlay::OverlayConfig;
//!
//! let config = OverlayConfig::from_json_str(r#"{ "tracker": { "virtual_depth": 1.5 } }"#).unwrap();
//! assert_eq!(config.tracker.virtual_depth, 1.5);
//! assert_eq!(config.tracker.horizontal_fov_degrees, 82.0);
//! assert_eq!(config.indicators.initial_pool_size, 5);
//! ```

use std::path::Path;

use overlay_catalog::PreferenceSet;
use sensor_fusion::{InterpolationMethod, PoseHistory};
use sensor_types::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{OverlayError, Result};

/// Camera model and localization settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Horizontal field of view of the capture camera, in degrees.
    pub horizontal_fov_degrees: f32,
    /// Near clip distance in metres.
    pub near: f32,
    /// Far clip distance in metres.
    pub far: f32,
    /// Distance along the view axis at which detections are placed, in metres.
    pub virtual_depth: f32,
    /// Detections captured longer ago than this are not localized, in seconds.
    pub max_detection_age_secs: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            horizontal_fov_degrees: 82.0,
            near: 1.0,
            far: 100.0,
            virtual_depth: 2.2,
            max_detection_age_secs: 0.5,
        }
    }
}

impl TrackerConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`] when the fov is outside
    /// `(0, 180)`, the clip planes are not `0 < near < far`, the virtual depth
    /// lies outside `[near, far]`, or the detection age is negative.
    pub fn validate(&self) -> Result<()> {
        let fov = self.horizontal_fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(OverlayError::invalid_config(format!(
                "horizontal_fov_degrees {fov} must be in (0, 180)"
            )));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(OverlayError::invalid_config(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                self.near, self.far
            )));
        }
        if !(self.virtual_depth >= self.near && self.virtual_depth <= self.far) {
            return Err(OverlayError::invalid_config(format!(
                "virtual_depth {} must lie between near and far",
                self.virtual_depth
            )));
        }
        if !(self.max_detection_age_secs.is_finite() && self.max_detection_age_secs >= 0.0) {
            return Err(OverlayError::invalid_config(format!(
                "max_detection_age_secs {} must be non-negative",
                self.max_detection_age_secs
            )));
        }
        Ok(())
    }

    /// Maximum detection age as a duration.
    #[must_use]
    pub fn max_detection_age(&self) -> Duration {
        Duration::from_secs_f64(self.max_detection_age_secs)
    }
}

/// Indicator pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Slots spawned up front.
    pub initial_pool_size: usize,
    /// Seconds without a sighting before an indicator hides.
    pub timeout_secs: f64,
    /// Exponential smoothing rate toward the target position, per second.
    pub smoothing_rate: f32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            initial_pool_size: 5,
            timeout_secs: 2.0,
            smoothing_rate: 12.0,
        }
    }
}

impl IndicatorConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`] for a non-positive timeout or
    /// smoothing rate.
    pub fn validate(&self) -> Result<()> {
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(OverlayError::invalid_config(format!(
                "timeout_secs {} must be positive",
                self.timeout_secs
            )));
        }
        if !(self.smoothing_rate > 0.0) {
            return Err(OverlayError::invalid_config(format!(
                "smoothing_rate {} must be positive",
                self.smoothing_rate
            )));
        }
        Ok(())
    }

    /// Timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

/// Head-pose history settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseHistoryConfig {
    /// Poses retained.
    pub capacity: usize,
    /// How far past the newest pose a query may reach, in seconds.
    pub tolerance_secs: f64,
    /// Interpolation between recorded poses.
    pub method: InterpolationMethod,
}

impl Default for PoseHistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 180,
            tolerance_secs: 0.05,
            method: InterpolationMethod::Linear,
        }
    }
}

impl PoseHistoryConfig {
    /// Builds an empty history with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`] for a zero capacity and
    /// propagates tolerance errors from [`PoseHistory::with_tolerance`].
    pub fn build(&self) -> Result<PoseHistory> {
        if self.capacity == 0 {
            return Err(OverlayError::invalid_config("pose history capacity must be non-zero"));
        }
        Ok(PoseHistory::new(self.capacity)
            .with_tolerance(self.tolerance_secs)?
            .with_method(self.method))
    }
}

/// Complete overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Localization settings.
    pub tracker: TrackerConfig,
    /// Indicator pool settings.
    pub indicators: IndicatorConfig,
    /// Head-pose history settings.
    pub pose_history: PoseHistoryConfig,
    /// Dietary warnings enabled at startup.
    pub preferences: PreferenceSet,
}

impl OverlayConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::ConfigParse`] for malformed JSON and
    /// [`OverlayError::InvalidConfig`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Io`] when the file cannot be read, otherwise
    /// as [`OverlayConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| OverlayError::io(path, e))?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), "Loaded overlay config");
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`OverlayError::InvalidConfig`] found.
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        self.indicators.validate()?;
        if self.pose_history.capacity == 0 {
            return Err(OverlayError::invalid_config("pose history capacity must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use overlay_catalog::PreferenceTag;

    #[test]
    fn defaults_are_valid() {
        let config = OverlayConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tracker.horizontal_fov_degrees, 82.0);
        assert_eq!(config.tracker.virtual_depth, 2.2);
        assert_eq!(config.indicators.timeout(), Duration::from_secs(2));
        assert!(config.preferences.is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let mut config = OverlayConfig::default();
        config.indicators.initial_pool_size = 8;
        config.tracker.near = 0.5;
        config.preferences.set(PreferenceTag::Lactose, true);

        let json = serde_json::to_string(&config).unwrap();
        let back = OverlayConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn rejects_non_positive_fov() {
        for fov in [0.0, -10.0, 180.0] {
            let mut config = OverlayConfig::default();
            config.tracker.horizontal_fov_degrees = fov;
            assert!(matches!(config.validate(), Err(OverlayError::InvalidConfig(_))));
        }
    }

    #[test]
    fn rejects_near_not_below_far() {
        let mut config = OverlayConfig::default();
        config.tracker.near = 100.0;
        assert!(matches!(config.validate(), Err(OverlayError::InvalidConfig(_))));
        config.tracker.near = 120.0;
        assert!(matches!(config.validate(), Err(OverlayError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let json = r#"{ "indicators": { "timeout_secs": 0 } }"#;
        assert!(matches!(
            OverlayConfig::from_json_str(json),
            Err(OverlayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_depth_outside_clip_range() {
        let config = TrackerConfig {
            virtual_depth: 0.5,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            OverlayConfig::from_json_str("{ tracker"),
            Err(OverlayError::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            OverlayConfig::from_json_file("/definitely/not/here.json"),
            Err(OverlayError::Io { .. })
        ));
    }

    #[test]
    fn pose_history_builds() {
        let history = PoseHistoryConfig::default().build().unwrap();
        assert!(history.is_empty());

        let bad = PoseHistoryConfig {
            tolerance_secs: -1.0,
            ..PoseHistoryConfig::default()
        };
        assert!(matches!(bad.build(), Err(OverlayError::Fusion(_))));
    }
}
