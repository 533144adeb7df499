//! Property-based tests for localization and the indicator pool.
//!
//! Run with: cargo test -p barcode-overlay -- proptest

use std::sync::Arc;

use barcode_overlay::{
    BarcodeFormat, DetectionEvent, IndicatorConfig, IndicatorHandle, IndicatorPool, IndicatorRenderer,
    IndicatorView, Localizer, TrackerConfig,
};
use glam::{Quat, Vec2, Vec3};
use overlay_catalog::{PreferenceSet, ProductCatalog, ProductRecord};
use proptest::prelude::*;
use sensor_fusion::Transform3D;
use sensor_types::{FrameSize, Timestamp};

// =============================================================================
// Strategies
// =============================================================================

/// Frames from 320 to 2560 pixels wide with aspect ratios between 1:2 and 2:1.
fn arb_frame() -> impl Strategy<Value = FrameSize> {
    (320u32..2560, 0.5f32..2.0).prop_map(|(w, aspect)| {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let h = ((w as f32 / aspect).round() as u32).max(1);
        FrameSize::new(w, h)
    })
}

/// A frame plus a pixel inside it.
fn arb_pixel() -> impl Strategy<Value = (FrameSize, Vec2)> {
    arb_frame().prop_flat_map(|frame| {
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (frame.width as f32, frame.height as f32);
        (Just(frame), 0.0..w, 0.0..h).prop_map(|(frame, x, y)| (frame, Vec2::new(x, y)))
    })
}

fn arb_head() -> impl Strategy<Value = Transform3D> {
    (
        prop::array::uniform3(-5.0f32..5.0),
        prop::array::uniform3(-1.0f32..1.0),
        0.0f32..std::f32::consts::TAU,
    )
        .prop_map(|(t, axis, angle)| {
            let axis = Vec3::from(axis).try_normalize().unwrap_or(Vec3::Y);
            Transform3D::new(Quat::from_axis_angle(axis, angle), Vec3::from(t))
        })
}

fn event(points: [Vec2; 2]) -> DetectionEvent {
    DetectionEvent {
        text: "p".to_string(),
        points: points.to_vec(),
        timestamp: Timestamp::zero(),
        format: BarcodeFormat::Code128,
    }
}

// =============================================================================
// Localization
// =============================================================================

proptest! {
    /// Lifting a pixel and projecting it back lands on the same pixel, at
    /// the configured depth.
    #[test]
    fn unproject_roundtrip((frame, pixel) in arb_pixel(), depth in 1.0f32..10.0) {
        let config = TrackerConfig { virtual_depth: depth, ..TrackerConfig::default() };
        let localizer = Localizer::new(config).unwrap();
        let projection = localizer.projection_for(frame).unwrap();

        let tracked = localizer
            .localize_event(&event([pixel, pixel]), frame, &projection, &Transform3D::identity())
            .unwrap();

        let head_point = tracked.start_point;
        prop_assert!((head_point.z - depth).abs() < 1e-3 * depth);

        let camera_point = Vec3::new(head_point.x, head_point.y, -head_point.z);
        let (uv, back_depth) = projection.project(camera_point).unwrap();
        let back = frame.viewport_to_pixel(uv);
        prop_assert!((back - pixel).length() < 0.05, "{pixel} -> {back}");
        prop_assert!((back_depth - depth).abs() < 1e-3 * depth);
    }

    /// Poses are finite for any pair of in-frame points and any head pose.
    #[test]
    fn pose_never_nan((frame, a) in arb_pixel(), b_frac in prop::array::uniform2(0.0f32..1.0), head in arb_head()) {
        #[allow(clippy::cast_precision_loss)]
        let b = Vec2::new(b_frac[0] * frame.width as f32, b_frac[1] * frame.height as f32);
        let localizer = Localizer::new(TrackerConfig::default()).unwrap();
        let tracked = localizer.localize(&[event([a, b])], frame, &|_: f64| Some(head));
        prop_assert_eq!(tracked.len(), 1);
        prop_assert!(tracked[0].pose.is_finite());
        prop_assert!(tracked[0].start_point.is_finite());
        prop_assert!(tracked[0].end_point.is_finite());
    }

    /// The pose sits midway between the segment ends.
    #[test]
    fn pose_is_segment_midpoint((frame, a) in arb_pixel(), head in arb_head()) {
        let b = Vec2::new(a.x * 0.5, a.y * 0.5);
        let localizer = Localizer::new(TrackerConfig::default()).unwrap();
        let tracked = localizer.localize(&[event([a, b])], frame, &|_: f64| Some(head));
        let t = &tracked[0];
        let mid = (t.start_point + t.end_point) * 0.5;
        prop_assert!((t.pose.translation - mid).length() < 1e-4);
    }
}

// =============================================================================
// Indicator pool
// =============================================================================

#[derive(Default)]
struct Counter(u64);

impl IndicatorRenderer for Counter {
    fn spawn(&mut self) -> IndicatorHandle {
        self.0 += 1;
        IndicatorHandle::new(self.0)
    }
    fn show(&mut self, _: IndicatorHandle, _: &IndicatorView) {}
    fn hide(&mut self, _: IndicatorHandle) {}
}

fn tracked(text: String, x: f32) -> barcode_overlay::TrackedBarcode {
    let center = Vec3::new(x, 0.0, 2.0);
    barcode_overlay::TrackedBarcode {
        text,
        format: BarcodeFormat::Ean13,
        start_point: center,
        end_point: center,
        pose: Transform3D::from_translation(center),
        last_seen: Timestamp::zero(),
    }
}

proptest! {
    /// Across any sequence of batches, no two active slots share a text and
    /// the pool only grows.
    #[test]
    fn pool_bindings_stay_unique(
        batches in prop::collection::vec(prop::collection::vec(0usize..12, 0..10), 1..20),
        step_ms in 10u64..1500,
    ) {
        let catalog = Arc::new(
            ProductCatalog::from_records((0..12).map(|i| ProductRecord::new(format!("p{i}"), "x", 1.0)))
                .unwrap(),
        );
        let mut pool = IndicatorPool::new(Counter::default(), IndicatorConfig::default(), catalog);
        let prefs = PreferenceSet::none();
        let mut size = pool.len();

        for (tick, batch) in batches.iter().enumerate() {
            let now = Timestamp::from_nanos(tick as u64 * step_ms * 1_000_000);
            #[allow(clippy::cast_precision_loss)]
            let batch: Vec<_> = batch.iter().map(|&i| tracked(format!("p{i}"), i as f32)).collect();
            pool.update(&batch, now, Vec3::ZERO, &prefs);

            let mut active: Vec<&str> = pool
                .slots()
                .iter()
                .filter(|s| s.is_active())
                .filter_map(|s| s.bound_text())
                .collect();
            let count = active.len();
            active.sort_unstable();
            active.dedup();
            prop_assert_eq!(active.len(), count);
            prop_assert_eq!(count, pool.active_count());

            for barcode in &batch {
                prop_assert!(pool.slot_for(&barcode.text).is_some());
            }

            prop_assert!(pool.len() >= size);
            size = pool.len();
        }
    }
}
