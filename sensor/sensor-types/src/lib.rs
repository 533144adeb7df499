//! Hardware-agnostic sensor types for the barcode overlay.
//!
//! This crate holds the small vocabulary shared by every stage that reasons
//! about the passthrough camera:
//!
//! - [`Timestamp`] / [`Duration`] - nanosecond timing on the device clock,
//!   used to align decoder captures with head-pose history
//! - [`FrameSize`] - pixel dimensions of a captured frame
//! - [`PerspectiveProjection`] - the capture camera's projection, used to
//!   unproject pixel detections into camera space
//!
//! # Layer 0 Crate
//!
//! No rendering or platform dependencies. Usable from tools, tests and the
//! on-device pipeline alike.
//!
//! # Example
//!
//! ```
//! use sensor_types::{FrameSize, PerspectiveProjection, Timestamp};
//!
//! let frame = FrameSize::new(1024, 768);
//! let proj = PerspectiveProjection::from_horizontal_fov(
//!     82.0,
//!     frame.aspect_ratio().unwrap(),
//!     1.0,
//!     100.0,
//! )
//! .unwrap();
//!
//! let uv = frame.pixel_to_viewport(512.0, 384.0).unwrap();
//! let p = proj.unproject(uv, 2.0);
//! assert!((p.z + 2.0).abs() < 1e-4);
//!
//! let captured = Timestamp::from_nanos(1_500_000_000);
//! assert!((captured.as_secs_f64() - 1.5).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod camera;
mod error;
mod time;

pub use camera::{FrameSize, PerspectiveProjection};
pub use error::SensorError;
pub use time::{Duration, Timestamp};
