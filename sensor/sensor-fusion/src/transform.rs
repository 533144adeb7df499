//! Rigid transforms for head poses and barcode poses.
//!
//! Convention: `+Y` is world up and `+Z` is "forward" for an oriented pose,
//! so a pose's rotation maps local `+Z` onto the direction it faces.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Squared length below which a direction counts as zero.
const DEGENERATE_EPSILON: f32 = 1e-12;

/// Rotation followed by translation.
///
/// Serves as the viewer's head pose (head frame to world) and as the world
/// pose of a localized barcode. Serializes with glam's array layout:
/// `{"rotation": [x, y, z, w], "translation": [x, y, z]}`.
///
/// ```
/// use glam::{Quat, Vec3};
/// use sensor_fusion::Transform3D;
///
/// // Standing at eye height, turned a quarter left.
/// let head = Transform3D::new(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), Vec3::Y * 1.6);
/// let ahead = head.apply_point(Vec3::Z * 2.0);
/// assert!((ahead - Vec3::new(2.0, 1.6, 0.0)).length() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Orientation.
    pub rotation: Quat,
    /// Position.
    pub translation: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// No rotation, at the origin.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Quat::IDENTITY, Vec3::ZERO)
    }

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(Quat::IDENTITY, translation)
    }

    /// Pure rotation.
    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(rotation, Vec3::ZERO)
    }

    /// Rotation then translation.
    #[must_use]
    pub const fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Maps a local point into the parent frame.
    #[must_use]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Blends toward `other`: lerp for translation, slerp for rotation.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(
            self.rotation.slerp(other.rotation, t),
            self.translation.lerp(other.translation, t),
        )
    }

    /// Returns true if no component is `NaN` or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.translation.is_finite()
    }

    /// Returns true if within `epsilon` of the identity, in radians and metres.
    #[must_use]
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.rotation.angle_between(Quat::IDENTITY) < epsilon && self.translation.length() < epsilon
    }

    /// Rotation whose local `+Z` points along `forward` and whose local `+Y`
    /// leans toward `up`.
    ///
    /// Returns `None` when `forward` has no length or is parallel to `up`.
    ///
    /// ```
    /// use glam::{Quat, Vec3};
    /// use sensor_fusion::Transform3D;
    ///
    /// let q = Transform3D::try_look_rotation(Vec3::X, Vec3::Y).unwrap();
    /// assert!((q * Vec3::Z - Vec3::X).length() < 1e-5);
    /// assert!(Transform3D::try_look_rotation(Vec3::Y, Vec3::Y).is_none());
    /// ```
    #[must_use]
    pub fn try_look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
        let forward = forward.try_normalize()?;
        let right = up.cross(forward);
        if !right.is_finite() || right.length_squared() < DEGENERATE_EPSILON {
            return None;
        }
        let right = right.normalize();
        let up = forward.cross(right);
        Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
    }

    /// Like [`Transform3D::try_look_rotation`], falling back to identity for
    /// degenerate input. Never produces `NaN`.
    #[must_use]
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
        Self::try_look_rotation(forward, up).unwrap_or(Quat::IDENTITY)
    }
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
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_is_identity() {
        assert!(Transform3D::default().is_identity(1e-6));
        assert!(!Transform3D::from_translation(Vec3::X).is_identity(1e-6));
        assert!(!Transform3D::from_rotation(Quat::from_rotation_z(0.1)).is_identity(1e-6));
    }

    #[test]
    fn rotates_before_translating() {
        let head = Transform3D::new(Quat::from_rotation_y(-FRAC_PI_2), Vec3::new(1.0, 0.0, 0.0));
        let p = head.apply_point(Vec3::Z);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn lerp_ends_and_middle() {
        let a = Transform3D::identity();
        let b = Transform3D::new(Quat::from_rotation_y(FRAC_PI_2), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(a.lerp(&b, 0.0).translation, Vec3::ZERO);
        assert_relative_eq!(a.lerp(&b, 1.0).translation.x, 10.0);

        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.translation.x, 5.0);
        assert_relative_eq!(
            mid.rotation.angle_between(Quat::IDENTITY),
            FRAC_PI_2 / 2.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn non_finite_is_detected() {
        let t = Transform3D::from_translation(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!t.is_finite());
        assert!(Transform3D::identity().is_finite());
    }

    #[test]
    fn look_rotation_forward_z_is_identity() {
        let q = Transform3D::look_rotation(Vec3::Z * 4.0, Vec3::Y);
        assert_relative_eq!(q.angle_between(Quat::IDENTITY), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_rotation_keeps_up_for_horizontal_forward() {
        let forward = Vec3::new(-1.0, 0.0, 1.0).normalize();
        let q = Transform3D::look_rotation(forward, Vec3::Y);
        assert_relative_eq!((q * Vec3::Z - forward).length(), 0.0, epsilon = 1e-5);
        assert_relative_eq!((q * Vec3::Y - Vec3::Y).length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_rotation_tilted_forward() {
        let forward = Vec3::new(0.0, 1.0, 1.0).normalize();
        let q = Transform3D::look_rotation(forward, Vec3::Y);
        assert_relative_eq!((q * Vec3::Z - forward).length(), 0.0, epsilon = 1e-5);
        // Right stays horizontal.
        assert_relative_eq!((q * Vec3::X).y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_rotation_degenerate_falls_back() {
        for forward in [Vec3::ZERO, Vec3::Y, -Vec3::Y * 3.0, Vec3::splat(f32::NAN)] {
            assert!(Transform3D::try_look_rotation(forward, Vec3::Y).is_none());
            assert_eq!(Transform3D::look_rotation(forward, Vec3::Y), Quat::IDENTITY);
        }
    }

    #[test]
    fn serializes_as_arrays() {
        let t = Transform3D::new(Quat::IDENTITY, Vec3::new(1.0, 1.5, -0.5));
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"rotation":[0.0,0.0,0.0,1.0],"translation":[1.0,1.5,-0.5]}"#);
        let back: Transform3D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
