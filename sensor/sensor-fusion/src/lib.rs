//! Sensor fusion utilities for the barcode overlay.
//!
//! This crate aligns asynchronous camera detections with the viewer's head
//! motion:
//!
//! # Stream Buffering
//!
//! - [`StreamBuffer`] - Bounded, time-ordered history of [`Sample`]s
//! - [`Bracket`] - Where a query time falls in that history
//!
//! # Temporal Interpolation
//!
//! - [`Interpolator`] - Resolves a pose between two recorded poses
//! - [`InterpolationMethod`] - Linear (lerp + slerp), nearest, or previous
//!
//! # Head-Pose History
//!
//! - [`PoseSource`] - "Where was the head at time t?"
//! - [`PoseHistory`] - Ring-buffer implementation of [`PoseSource`]
//!
//! # Coordinate Transforms
//!
//! - [`Transform3D`] - Rigid body transform (rotation + translation) and
//!   NaN-safe look rotations
//!
//! # Layer 0 Crate
//!
//! No rendering or platform dependencies.
//!
//! # Example
//!
//! ```
//! use sensor_fusion::{PoseHistory, PoseSource, Transform3D};
//! use glam::Vec3;
//!
//! let mut history = PoseHistory::new(90);
//! history.record(0.0, Transform3D::identity()).unwrap();
//! history.record(0.1, Transform3D::from_translation(Vec3::new(0.0, 0.0, 1.0))).unwrap();
//!
//! let head = history.pose_at(0.05).unwrap();
//! let world = head.apply_point(Vec3::ZERO);
//! assert!((world.z - 0.5).abs() < 1e-5);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod buffer;
mod error;
mod interpolation;
mod pose;
mod transform;

pub use buffer::{Bracket, Sample, StreamBuffer};

pub use interpolation::{InterpolationMethod, Interpolator, lerp_factor};

pub use pose::{PoseHistory, PoseSource};

pub use transform::Transform3D;

pub use error::{FusionError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{FusionError, PoseHistory, PoseSource, Transform3D};
}
