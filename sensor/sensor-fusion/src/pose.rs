//! Head-pose history.
//!
//! Detections arrive stamped with the time their frame was captured, which
//! can be several frames in the past. [`PoseSource`] answers "where was the
//! head at that instant"; [`PoseHistory`] implements it over a short ring
//! buffer of recent head poses.

use crate::buffer::StreamBuffer;
use crate::error::{FusionError, Result};
use crate::interpolation::{InterpolationMethod, Interpolator};
use crate::transform::Transform3D;

/// Supplies the viewer's head pose (head frame to world) at a past instant.
///
/// Implementations must be cheap and non-blocking: the localizer queries
/// once per detection on the render tick. `None` means no pose is known for
/// that time (typically: older than the retained history).
///
/// Closures implement the trait:
///
/// ```
/// use sensor_fusion::{PoseSource, Transform3D};
///
/// let fixed = |_seconds: f64| Some(Transform3D::identity());
/// assert!(fixed.pose_at(12.5).is_some());
/// ```
pub trait PoseSource {
    /// Returns the head pose at `seconds` on the capture clock.
    fn pose_at(&self, seconds: f64) -> Option<Transform3D>;
}

impl<F> PoseSource for F
where
    F: Fn(f64) -> Option<Transform3D>,
{
    fn pose_at(&self, seconds: f64) -> Option<Transform3D> {
        self(seconds)
    }
}

/// Ring buffer of timestamped head poses.
///
/// Queries inside the buffered window are interpolated. Queries slightly
/// newer than the latest sample (within `tolerance` seconds) resolve to the
/// latest sample, which covers a detection captured after the last pose
/// update of the frame. Anything else is unknown.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use sensor_fusion::{PoseHistory, PoseSource, Transform3D};
///
/// let mut history = PoseHistory::new(90).with_tolerance(0.05).unwrap();
/// history.record(0.0, Transform3D::identity()).unwrap();
/// history.record(0.1, Transform3D::from_translation(Vec3::X)).unwrap();
///
/// let mid = history.pose_at(0.05).unwrap();
/// assert!((mid.translation.x - 0.5).abs() < 1e-5);
///
/// assert!(history.pose_at(0.12).is_some()); // within tolerance
/// assert!(history.pose_at(-1.0).is_none()); // too old
/// ```
#[derive(Debug, Clone)]
pub struct PoseHistory {
    samples: StreamBuffer<Transform3D>,
    interpolator: Interpolator,
    tolerance: f64,
}

impl PoseHistory {
    /// Creates a history retaining the last `capacity` poses.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: StreamBuffer::new(capacity),
            interpolator: Interpolator::linear(),
            tolerance: 0.0,
        }
    }

    /// Sets how far past the newest sample a query may reach, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::InvalidConfig`] for negative or non-finite values.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(FusionError::invalid_config(format!(
                "pose tolerance {tolerance} must be finite and non-negative"
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Sets the interpolation method.
    #[must_use]
    pub const fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.interpolator = Interpolator::new(method);
        self
    }

    /// Records the head pose observed at `seconds`.
    ///
    /// # Errors
    ///
    /// Propagates [`StreamBuffer::push`] errors for out-of-order or
    /// non-finite timestamps.
    pub fn record(&mut self, seconds: f64, pose: Transform3D) -> Result<()> {
        self.samples.push(seconds, pose)
    }

    /// Newest recorded pose.
    #[must_use]
    pub fn latest(&self) -> Option<Transform3D> {
        self.samples.latest().map(|sample| sample.value)
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no pose has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time span covered by the history, `(oldest, newest)`.
    #[must_use]
    pub fn window(&self) -> Option<(f64, f64)> {
        self.samples.window()
    }

    /// Resolves a pose, reporting why it could not be resolved.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::NoSamples`] when empty and
    /// [`FusionError::OutsideWindow`] outside the window plus tolerance.
    pub fn resolve(&self, seconds: f64) -> Result<Transform3D> {
        let (min, max) = self
            .samples
            .window()
            .ok_or(FusionError::NoSamples("no head poses recorded"))?;

        if seconds > max && seconds - max <= self.tolerance {
            return self
                .latest()
                .ok_or(FusionError::NoSamples("no head poses recorded"));
        }
        if seconds < min || seconds > max {
            return Err(FusionError::outside_window(seconds, min, max));
        }
        self.interpolator.interpolate_pose(&self.samples, seconds)
    }
}

impl PoseSource for PoseHistory {
    fn pose_at(&self, seconds: f64) -> Option<Transform3D> {
        self.resolve(seconds).ok()
    }
}
