//! Capture-camera geometry.
//!
//! The passthrough decoder reports barcode corners in pixel coordinates of
//! the captured frame. [`PerspectiveProjection`] models the camera that
//! produced that frame so pixels can be lifted back into camera space.
//!
//! # Conventions
//!
//! - Pixel origin is top-left, `y` grows downward.
//! - Viewport coordinates `(u, v)` are in `[0, 1]` with origin bottom-left.
//! - Camera space is right-handed OpenGL style: the camera looks down `-Z`.

use glam::{Mat4, Vec2, Vec3, Vec4};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Pixel dimensions of a captured frame.
///
/// # Example
///
/// ```
/// use sensor_types::FrameSize;
///
/// let size = FrameSize::new(1024, 1024);
/// let uv = size.pixel_to_viewport(256.0, 256.0).unwrap();
/// assert!((uv.x - 0.25).abs() < 1e-6);
/// assert!((uv.y - 0.75).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameSize {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Creates a frame size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the aspect ratio (width / height).
    ///
    /// Returns `None` for an empty frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }

    /// Converts a pixel position to normalized viewport coordinates.
    ///
    /// `v` is flipped so that the viewport origin is bottom-left.
    /// Returns `None` for an empty frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_to_viewport(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            x / self.width as f32,
            1.0 - y / self.height as f32,
        ))
    }

    /// Converts normalized viewport coordinates back to a pixel position.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn viewport_to_pixel(&self, uv: Vec2) -> Vec2 {
        Vec2::new(
            uv.x * self.width as f32,
            (1.0 - uv.y) * self.height as f32,
        )
    }
}

/// Perspective model of the capture camera.
///
/// Built from a horizontal field of view and the capture frame's aspect
/// ratio, so it always matches the frame the decoder saw rather than the
/// live display.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use sensor_types::PerspectiveProjection;
///
/// let proj = PerspectiveProjection::from_horizontal_fov(82.0, 1.0, 1.0, 100.0).unwrap();
///
/// // The viewport centre unprojects onto the optical axis.
/// let p = proj.unproject(Vec2::new(0.5, 0.5), 2.0);
/// assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
/// assert!((p.z + 2.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveProjection {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    matrix: Mat4,
    inverse: Mat4,
}

impl PerspectiveProjection {
    /// Creates a projection from a horizontal field of view in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidProjection`] if the field of view is not
    /// in `(0, 180)`, the aspect is not positive, or the clip planes are not
    /// `0 < near < far`.
    pub fn from_horizontal_fov(
        fov_x_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, SensorError> {
        if !(fov_x_degrees > 0.0 && fov_x_degrees < 180.0) {
            return Err(SensorError::invalid_projection(format!(
                "horizontal fov {fov_x_degrees} deg outside (0, 180)"
            )));
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(SensorError::invalid_projection(format!(
                "aspect {aspect} must be positive"
            )));
        }
        if !(near > 0.0 && far > near) {
            return Err(SensorError::invalid_projection(format!(
                "clip planes near={near} far={far} must satisfy 0 < near < far"
            )));
        }

        let half_x = fov_x_degrees.to_radians() * 0.5;
        let fov_y = 2.0 * (half_x.tan() / aspect).atan();
        let matrix = Mat4::perspective_rh_gl(fov_y, aspect, near, far);

        Ok(Self {
            fov_y,
            aspect,
            near,
            far,
            matrix,
            inverse: matrix.inverse(),
        })
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub const fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Aspect ratio (width / height).
    #[must_use]
    pub const fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Near and far clip distances.
    #[must_use]
    pub const fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// The projection matrix (camera space to clip space).
    #[must_use]
    pub const fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Normalized-device depth of a point `depth` metres in front of the camera.
    #[must_use]
    pub fn ndc_depth(&self, depth: f32) -> f32 {
        let clip = self.matrix * Vec4::new(0.0, 0.0, -depth, 1.0);
        clip.z / clip.w
    }

    /// Lifts viewport coordinates into camera space at the given view depth.
    ///
    /// The result lies on the plane `z = -depth`.
    #[must_use]
    pub fn unproject(&self, uv: Vec2, depth: f32) -> Vec3 {
        let ndc = 2.0 * uv - Vec2::ONE;
        let p = self.inverse * Vec4::new(ndc.x, ndc.y, self.ndc_depth(depth), 1.0);
        p.truncate() / p.w
    }

    /// Projects a camera-space point to viewport coordinates and view depth.
    ///
    /// Returns `None` for points at or behind the camera plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.matrix * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let uv = (Vec2::new(ndc.x, ndc.y) + Vec2::ONE) * 0.5;
        Some((uv, -point.z))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projection(aspect: f32) -> PerspectiveProjection {
        PerspectiveProjection::from_horizontal_fov(82.0, aspect, 1.0, 100.0).unwrap()
    }

    #[test]
    fn frame_size_viewport_flip() {
        let size = FrameSize::new(640, 480);
        let uv = size.pixel_to_viewport(0.0, 0.0).unwrap();
        assert_relative_eq!(uv.x, 0.0);
        assert_relative_eq!(uv.y, 1.0);

        let uv = size.pixel_to_viewport(640.0, 480.0).unwrap();
        assert_relative_eq!(uv.x, 1.0);
        assert_relative_eq!(uv.y, 0.0);
    }

    #[test]
    fn frame_size_empty() {
        let size = FrameSize::new(0, 480);
        assert!(size.is_empty());
        assert!(size.aspect_ratio().is_none());
        assert!(size.pixel_to_viewport(1.0, 1.0).is_none());
    }

    #[test]
    fn frame_size_pixel_roundtrip() {
        let size = FrameSize::new(1280, 960);
        let uv = size.pixel_to_viewport(100.0, 200.0).unwrap();
        let px = size.viewport_to_pixel(uv);
        assert_relative_eq!(px.x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(px.y, 200.0, epsilon = 1e-3);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(PerspectiveProjection::from_horizontal_fov(0.0, 1.0, 1.0, 100.0).is_err());
        assert!(PerspectiveProjection::from_horizontal_fov(180.0, 1.0, 1.0, 100.0).is_err());
        assert!(PerspectiveProjection::from_horizontal_fov(82.0, 0.0, 1.0, 100.0).is_err());
        assert!(PerspectiveProjection::from_horizontal_fov(82.0, 1.0, 0.0, 100.0).is_err());
        assert!(PerspectiveProjection::from_horizontal_fov(82.0, 1.0, 5.0, 5.0).is_err());
        assert!(PerspectiveProjection::from_horizontal_fov(f32::NAN, 1.0, 1.0, 100.0).is_err());
    }

    #[test]
    fn square_frame_has_equal_fovs() {
        let proj = projection(1.0);
        assert_relative_eq!(proj.fov_y(), 82f32.to_radians(), epsilon = 1e-5);
    }

    #[test]
    fn wide_frame_narrows_vertical_fov() {
        let proj = projection(16.0 / 9.0);
        assert!(proj.fov_y() < 82f32.to_radians());
    }

    #[test]
    fn horizontal_edge_matches_fov() {
        let proj = projection(1.5);
        let p = proj.unproject(Vec2::new(1.0, 0.5), 3.0);
        let half = (p.x / -p.z).atan();
        assert_relative_eq!(half, 41f32.to_radians(), epsilon = 1e-4);
    }

    #[test]
    fn ndc_depth_spans_clip_planes() {
        let proj = projection(1.0);
        assert_relative_eq!(proj.ndc_depth(1.0), -1.0, epsilon = 1e-5);
        assert_relative_eq!(proj.ndc_depth(100.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn unproject_lies_on_depth_plane() {
        let proj = projection(4.0 / 3.0);
        for uv in [Vec2::new(0.1, 0.9), Vec2::new(0.7, 0.2), Vec2::new(0.5, 0.5)] {
            let p = proj.unproject(uv, 2.2);
            assert_relative_eq!(p.z, -2.2, epsilon = 1e-4);
        }
    }

    #[test]
    fn project_unproject_roundtrip() {
        let proj = projection(4.0 / 3.0);
        let point = Vec3::new(0.3, -0.2, -1.7);
        let (uv, depth) = proj.project(point).unwrap();
        let back = proj.unproject(uv, depth);
        assert_relative_eq!(back.x, point.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, point.y, epsilon = 1e-4);
        assert_relative_eq!(back.z, point.z, epsilon = 1e-4);
    }

    #[test]
    fn project_behind_camera() {
        let proj = projection(1.0);
        assert!(proj.project(Vec3::new(0.0, 0.0, 1.0)).is_none());
    }
}
