//! Resolving a pose between recorded head poses.

use serde::{Deserialize, Serialize};

use crate::buffer::{Bracket, StreamBuffer};
use crate::error::{FusionError, Result};
use crate::transform::Transform3D;

/// How to fill in a pose between two recorded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Lerp translation, slerp rotation.
    #[default]
    Linear,
    /// Whichever recorded pose is closer in time; ties go to the older one.
    Nearest,
    /// The older recorded pose.
    Previous,
}

/// Resolves head poses from a [`StreamBuffer`] of recorded poses.
///
/// ```
/// use glam::Vec3;
/// use sensor_fusion::{Interpolator, StreamBuffer, Transform3D};
///
/// let mut poses = StreamBuffer::new(8);
/// poses.push(0.0, Transform3D::identity()).unwrap();
/// poses.push(1.0, Transform3D::from_translation(Vec3::new(10.0, 0.0, 0.0))).unwrap();
///
/// let head = Interpolator::linear().interpolate_pose(&poses, 0.25).unwrap();
/// assert!((head.translation.x - 2.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interpolator {
    method: InterpolationMethod,
}

impl Interpolator {
    /// Creates an interpolator.
    #[must_use]
    pub const fn new(method: InterpolationMethod) -> Self {
        Self { method }
    }

    /// Lerp/slerp interpolator.
    #[must_use]
    pub const fn linear() -> Self {
        Self::new(InterpolationMethod::Linear)
    }

    /// The configured method.
    #[must_use]
    pub const fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Pose at `time` seconds.
    ///
    /// # Errors
    ///
    /// [`FusionError::NoSamples`] for an empty buffer and
    /// [`FusionError::OutsideWindow`] when `time` is outside the recorded
    /// window.
    pub fn interpolate_pose(&self, poses: &StreamBuffer<Transform3D>, time: f64) -> Result<Transform3D> {
        let (min, max) = poses.window().ok_or(FusionError::NoSamples("no poses recorded"))?;
        let bracket = poses
            .bracket(time)
            .ok_or(FusionError::outside_window(time, min, max))?;

        let (before, after) = match bracket {
            Bracket::Exact(sample) => return Ok(sample.value),
            Bracket::Between(before, after) => (before, after),
        };

        Ok(match self.method {
            InterpolationMethod::Linear => {
                #[allow(clippy::cast_possible_truncation)]
                let t = lerp_factor(before.time, after.time, time) as f32;
                before.value.lerp(&after.value, t)
            }
            InterpolationMethod::Nearest if after.time - time < time - before.time => after.value,
            InterpolationMethod::Nearest | InterpolationMethod::Previous => before.value,
        })
    }
}

/// Fraction of the way `x` lies from `a` to `b`; zero when `a` and `b`
/// coincide.
#[must_use]
pub fn lerp_factor(a: f64, b: f64, x: f64) -> f64 {
    let span = b - a;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    (x - a) / span
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    /// Identity at 0 s, quarter turn and 2 m along +X at 1 s.
    fn turn_and_step() -> StreamBuffer<Transform3D> {
        let mut poses = StreamBuffer::new(8);
        poses.push(0.0, Transform3D::identity()).unwrap();
        poses
            .push(
                1.0,
                Transform3D::new(Quat::from_rotation_y(FRAC_PI_2), Vec3::new(2.0, 0.0, 0.0)),
            )
            .unwrap();
        poses
    }

    #[test]
    fn default_is_linear() {
        assert_eq!(Interpolator::default().method(), InterpolationMethod::Linear);
        assert_eq!(
            serde_json::to_string(&InterpolationMethod::Previous).unwrap(),
            "\"previous\""
        );
    }

    #[test]
    fn linear_midpoint_lerps_and_slerps() {
        let head = Interpolator::linear()
            .interpolate_pose(&turn_and_step(), 0.5)
            .unwrap();
        assert_relative_eq!(head.translation.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(
            head.rotation.angle_between(Quat::IDENTITY),
            FRAC_PI_2 / 2.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn exact_hit_returns_sample() {
        let head = Interpolator::linear()
            .interpolate_pose(&turn_and_step(), 1.0)
            .unwrap();
        assert_relative_eq!(head.translation.x, 2.0);
    }

    #[test]
    fn nearest_and_previous() {
        let poses = turn_and_step();
        let nearest = Interpolator::new(InterpolationMethod::Nearest);
        assert_relative_eq!(nearest.interpolate_pose(&poses, 0.7).unwrap().translation.x, 2.0);
        assert_relative_eq!(nearest.interpolate_pose(&poses, 0.5).unwrap().translation.x, 0.0);

        let previous = Interpolator::new(InterpolationMethod::Previous);
        assert_relative_eq!(previous.interpolate_pose(&poses, 0.9).unwrap().translation.x, 0.0);
    }

    #[test]
    fn empty_or_outside_window() {
        let empty = StreamBuffer::new(8);
        assert!(matches!(
            Interpolator::linear().interpolate_pose(&empty, 0.5),
            Err(FusionError::NoSamples(_))
        ));

        let poses = turn_and_step();
        assert!(matches!(
            Interpolator::linear().interpolate_pose(&poses, -1.0),
            Err(FusionError::OutsideWindow { min, max, .. }) if min == 0.0 && max == 1.0
        ));
        assert!(Interpolator::linear().interpolate_pose(&poses, 2.0).is_err());
    }

    #[test]
    fn lerp_factor_spans() {
        assert_relative_eq!(lerp_factor(0.0, 10.0, 5.0), 0.5);
        assert_relative_eq!(lerp_factor(2.0, 4.0, 4.0), 1.0);
        assert_relative_eq!(lerp_factor(3.0, 3.0, 3.0), 0.0);
    }
}
