//! Spatial localization of detections.
//!
//! A detection is a 2D segment in a frame captured some time ago. The
//! [`Localizer`] lifts both ends onto a plane at a fixed virtual depth in
//! front of the capture camera, then carries them into world space with the
//! head pose from the capture instant.

use glam::{Vec2, Vec3};
use sensor_fusion::{PoseSource, Transform3D};
use sensor_types::{FrameSize, PerspectiveProjection, Timestamp};
use tracing::{debug, trace, warn};

use crate::config::TrackerConfig;
use crate::detection::{BarcodeFormat, DetectionEvent};
use crate::error::Result;

/// A detection placed in world space.
///
/// Rebuilt from scratch on every localization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBarcode {
    /// Decoded text.
    pub text: String,
    /// Reported symbology.
    pub format: BarcodeFormat,
    /// World position of the first scan-line end.
    pub start_point: Vec3,
    /// World position of the second scan-line end.
    pub end_point: Vec3,
    /// Midpoint of the segment, oriented with `+Z` along it.
    pub pose: Transform3D,
    /// Capture time of the detection.
    pub last_seen: Timestamp,
}

/// Lifts pixel detections into world space.
#[derive(Debug, Clone)]
pub struct Localizer {
    config: TrackerConfig,
}

impl Localizer {
    /// Creates a localizer.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`](crate::OverlayError::InvalidConfig)
    /// when the config fails validation.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active settings.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Camera model for a capture frame.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyFrame`](sensor_types::SensorError::EmptyFrame)
    /// for a zero-area frame.
    pub fn projection_for(&self, frame: FrameSize) -> Result<PerspectiveProjection> {
        let aspect = frame
            .aspect_ratio()
            .ok_or_else(|| sensor_types::SensorError::empty_frame(frame.width, frame.height))?;
        Ok(PerspectiveProjection::from_horizontal_fov(
            self.config.horizontal_fov_degrees,
            aspect,
            self.config.near,
            self.config.far,
        )?)
    }

    /// Localizes every event for which a head pose is known.
    ///
    /// Events whose capture time has no pose are skipped. A zero-area frame
    /// yields nothing.
    pub fn localize<P>(
        &self,
        events: &[DetectionEvent],
        frame: FrameSize,
        poses: &P,
    ) -> Vec<TrackedBarcode>
    where
        P: PoseSource + ?Sized,
    {
        self.localize_filtered(events, frame, poses, |_| true)
    }

    /// Like [`Localizer::localize`], additionally skipping events captured
    /// more than `max_detection_age_secs` before `now`.
    ///
    /// A cached batch that is re-emitted tick after tick stops producing
    /// tracked barcodes once it is stale, which lets its indicators expire.
    pub fn localize_recent<P>(
        &self,
        events: &[DetectionEvent],
        frame: FrameSize,
        poses: &P,
        now: Timestamp,
    ) -> Vec<TrackedBarcode>
    where
        P: PoseSource + ?Sized,
    {
        let max_age = self.config.max_detection_age();
        self.localize_filtered(events, frame, poses, |event| {
            let recent = now.saturating_since(event.timestamp) <= max_age;
            if !recent {
                trace!(text = %event.text, "Detection too old to localize");
            }
            recent
        })
    }

    fn localize_filtered<P, F>(
        &self,
        events: &[DetectionEvent],
        frame: FrameSize,
        poses: &P,
        mut keep: F,
    ) -> Vec<TrackedBarcode>
    where
        P: PoseSource + ?Sized,
        F: FnMut(&DetectionEvent) -> bool,
    {
        let projection = match self.projection_for(frame) {
            Ok(projection) => projection,
            Err(e) => {
                warn!(error = %e, "Cannot localize detections for this frame");
                return Vec::new();
            }
        };

        events
            .iter()
            .filter(|&event| keep(event))
            .filter_map(|event| {
                let seconds = event.timestamp.as_secs_f64();
                let Some(head) = poses.pose_at(seconds) else {
                    debug!(text = %event.text, seconds, "No head pose for detection, skipping");
                    return None;
                };
                self.localize_event(event, frame, &projection, &head)
            })
            .collect()
    }

    /// Places one event given its frame's camera model and head pose.
    ///
    /// Returns `None` if the event has fewer than two points.
    #[must_use]
    pub fn localize_event(
        &self,
        event: &DetectionEvent,
        frame: FrameSize,
        projection: &PerspectiveProjection,
        head: &Transform3D,
    ) -> Option<TrackedBarcode> {
        let (start_px, end_px) = event.segment()?;
        let start_point = head.apply_point(self.head_space_point(frame, projection, start_px)?);
        let end_point = head.apply_point(self.head_space_point(frame, projection, end_px)?);

        let center = (start_point + end_point) * 0.5;
        let rotation = Transform3D::look_rotation(end_point - start_point, Vec3::Y);

        Some(TrackedBarcode {
            text: event.text.clone(),
            format: event.format.clone(),
            start_point,
            end_point,
            pose: Transform3D::new(rotation, center),
            last_seen: event.timestamp,
        })
    }

    /// Lifts a pixel to head space (`+Z` forward) at the virtual depth.
    fn head_space_point(
        &self,
        frame: FrameSize,
        projection: &PerspectiveProjection,
        pixel: Vec2,
    ) -> Option<Vec3> {
        let uv = frame.pixel_to_viewport(pixel.x, pixel.y)?;
        let camera = projection.unproject(uv, self.config.virtual_depth);
        Some(Vec3::new(camera.x, camera.y, -camera.z))
    }
}
