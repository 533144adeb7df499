//! Indicator pool and lifecycle.
//!
//! Each known product in view gets one floating indicator: a label with the
//! product details and a line marking the scanned segment. Indicators live in
//! a pool of renderer-side objects that grows on demand and never shrinks.
//! A slot is bound to one barcode text while active and released after
//! `timeout` without a sighting.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};
use overlay_catalog::{PreferenceSet, ProductCatalog, ProductRecord, warnings_for};
use sensor_fusion::Transform3D;
use sensor_types::Timestamp;
use tracing::{debug, info, trace};

use crate::config::IndicatorConfig;
use crate::tracker::TrackedBarcode;

/// Opaque renderer-side object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorHandle(u64);

impl IndicatorHandle {
    /// Wraps a renderer id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The renderer id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndicatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "indicator#{}", self.0)
    }
}

/// Text shown on an indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorLabel {
    /// Product details.
    pub body: String,
    /// Dietary warning line, present only when a preference is implicated.
    pub warning: Option<String>,
}

impl IndicatorLabel {
    /// Composes the label for `record` under the enabled preferences.
    ///
    /// ```
    /// use barcode_overlay::IndicatorLabel;
    /// use overlay_catalog::{PreferenceSet, PreferenceTag, ProductRecord};
    ///
    /// let record = ProductRecord::new("1", "Pizza", 5.0)
    ///     .with_ingredients(["Wheat flour", "Mozzarella cheese"]);
    /// let prefs = PreferenceSet::from_tags([PreferenceTag::Gluten, PreferenceTag::Lactose]);
    /// let label = IndicatorLabel::compose(&record, &prefs);
    /// assert_eq!(label.warning.as_deref(), Some("Contains: Gluten, Lactose"));
    /// ```
    #[must_use]
    pub fn compose(record: &ProductRecord, preferences: &PreferenceSet) -> Self {
        let warnings = warnings_for(record, preferences);
        Self {
            body: record.to_string(),
            warning: (!warnings.is_empty()).then(|| format!("Contains: {}", warnings.join(", "))),
        }
    }
}

impl fmt::Display for IndicatorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)?;
        if let Some(warning) = &self.warning {
            write!(f, "\n{warning}")?;
        }
        Ok(())
    }
}

/// Everything the renderer needs to draw one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorView {
    /// Smoothed world position.
    pub position: Vec3,
    /// Yaw-only rotation facing away from the viewer.
    pub rotation: Quat,
    /// Scanned segment endpoints, shifted with the smoothed position.
    pub line: [Vec3; 2],
    /// Label text.
    pub label: IndicatorLabel,
}

/// Rendering backend for indicators.
///
/// The pool drives it: `spawn` when growing, `show` whenever a slot is
/// refreshed, `hide` when a slot expires.
pub trait IndicatorRenderer {
    /// Creates a hidden indicator object.
    fn spawn(&mut self) -> IndicatorHandle;
    /// Makes the indicator visible with this content.
    fn show(&mut self, handle: IndicatorHandle, view: &IndicatorView);
    /// Hides the indicator.
    fn hide(&mut self, handle: IndicatorHandle);
}

/// One pooled indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSlot {
    handle: IndicatorHandle,
    bound_text: Option<String>,
    target_pose: Transform3D,
    current_position: Vec3,
    rotation: Quat,
    line: [Vec3; 2],
    last_seen: Timestamp,
    active: bool,
}

impl IndicatorSlot {
    fn new(handle: IndicatorHandle) -> Self {
        Self {
            handle,
            bound_text: None,
            target_pose: Transform3D::identity(),
            current_position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            line: [Vec3::ZERO; 2],
            last_seen: Timestamp::zero(),
            active: false,
        }
    }

    /// Renderer handle.
    #[must_use]
    pub const fn handle(&self) -> IndicatorHandle {
        self.handle
    }

    /// Text this slot is bound to, if active.
    #[must_use]
    pub fn bound_text(&self) -> Option<&str> {
        self.bound_text.as_deref()
    }

    /// Latest localized pose.
    #[must_use]
    pub const fn target_pose(&self) -> &Transform3D {
        &self.target_pose
    }

    /// Smoothed position shown to the user.
    #[must_use]
    pub const fn current_position(&self) -> Vec3 {
        self.current_position
    }

    /// Displayed rotation.
    #[must_use]
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Tick time of the last refresh.
    #[must_use]
    pub const fn last_seen(&self) -> Timestamp {
        self.last_seen
    }

    /// Whether the slot is shown.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) {
        self.active = false;
        self.bound_text = None;
    }
}

/// Pool of indicators bound to tracked barcodes.
#[derive(Debug)]
pub struct IndicatorPool<R> {
    renderer: R,
    slots: Vec<IndicatorSlot>,
    config: IndicatorConfig,
    catalog: Arc<ProductCatalog>,
    last_update: Option<Timestamp>,
}

impl<R: IndicatorRenderer> IndicatorPool<R> {
    /// Creates a pool with `config.initial_pool_size` hidden slots.
    pub fn new(mut renderer: R, config: IndicatorConfig, catalog: Arc<ProductCatalog>) -> Self {
        let slots = (0..config.initial_pool_size)
            .map(|_| {
                let handle = renderer.spawn();
                renderer.hide(handle);
                IndicatorSlot::new(handle)
            })
            .collect();
        Self {
            renderer,
            slots,
            config,
            catalog,
            last_update: None,
        }
    }

    /// Refreshes indicators from this tick's tracked barcodes, then expires
    /// the ones not seen for longer than the timeout.
    ///
    /// Barcodes whose text is not in the catalog are ignored. Calling again
    /// with the same `now` changes nothing.
    pub fn update(
        &mut self,
        tracked: &[TrackedBarcode],
        now: Timestamp,
        viewer_position: Vec3,
        preferences: &PreferenceSet,
    ) {
        let dt = self
            .last_update
            .map_or(0.0, |prev| now.saturating_since(prev).as_secs_f64());
        self.last_update = Some(self.last_update.map_or(now, |prev| prev.max(now)));
        #[allow(clippy::cast_possible_truncation)]
        let alpha = smoothing_alpha(self.config.smoothing_rate, dt as f32);

        let catalog = Arc::clone(&self.catalog);
        let mut bound: HashMap<String, usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.bound_text.clone().map(|text| (text, i)))
            .collect();
        let mut refreshed = HashSet::new();

        for barcode in tracked {
            let Some(record) = catalog.lookup(&barcode.text) else {
                trace!(text = %barcode.text, "Unknown product, no indicator");
                continue;
            };

            let (index, fresh) = match bound.get(&barcode.text) {
                Some(&index) => (index, false),
                None => {
                    let index = self.acquire_slot();
                    bound.insert(barcode.text.clone(), index);
                    (index, true)
                }
            };
            if !refreshed.insert(index) {
                trace!(text = %barcode.text, "Indicator already refreshed this tick");
                continue;
            }

            let slot = &mut self.slots[index];
            if fresh {
                debug!(text = %barcode.text, handle = %slot.handle, "Bound indicator");
                slot.bound_text = Some(barcode.text.clone());
                slot.current_position = barcode.pose.translation;
                slot.rotation = yaw_rotation(barcode.pose.rotation);
            } else {
                slot.current_position = slot
                    .current_position
                    .lerp(barcode.pose.translation, alpha);
            }
            slot.target_pose = barcode.pose;
            slot.last_seen = now;
            slot.active = true;

            let offset = slot.current_position - barcode.pose.translation;
            slot.line = [barcode.start_point + offset, barcode.end_point + offset];
            slot.rotation = billboard(slot.current_position, viewer_position)
                .unwrap_or_else(|| yaw_rotation(barcode.pose.rotation));

            let view = IndicatorView {
                position: slot.current_position,
                rotation: slot.rotation,
                line: slot.line,
                label: IndicatorLabel::compose(record, preferences),
            };
            self.renderer.show(slot.handle, &view);
        }

        self.expire(now);
        debug_assert!(self.bindings_unique(), "two active indicators share a barcode");
    }

    /// Hides every active indicator and unbinds it.
    pub fn hide_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.active) {
            self.renderer.hide(slot.handle);
            slot.release();
        }
    }

    fn expire(&mut self, now: Timestamp) {
        let timeout = self.config.timeout();
        for slot in self.slots.iter_mut().filter(|slot| slot.active) {
            if now.saturating_since(slot.last_seen) > timeout {
                debug!(text = ?slot.bound_text, handle = %slot.handle, "Indicator timed out");
                self.renderer.hide(slot.handle);
                slot.release();
            }
        }
    }

    /// Index of the first inactive slot, spawning one if all are busy.
    fn acquire_slot(&mut self) -> usize {
        if let Some(index) = self.slots.iter().position(|slot| !slot.active) {
            return index;
        }
        let handle = self.renderer.spawn();
        self.slots.push(IndicatorSlot::new(handle));
        info!(size = self.slots.len(), "Grew indicator pool");
        self.slots.len() - 1
    }

    fn bindings_unique(&self) -> bool {
        let mut seen = HashSet::new();
        self.slots
            .iter()
            .filter_map(|slot| slot.active.then_some(slot.bound_text.as_deref()).flatten())
            .all(|text| seen.insert(text))
    }

    /// All slots, active or not.
    #[must_use]
    pub fn slots(&self) -> &[IndicatorSlot] {
        &self.slots
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the pool has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of visible indicators.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// The active slot bound to `text`.
    #[must_use]
    pub fn slot_for(&self, text: &str) -> Option<&IndicatorSlot> {
        self.slots
            .iter()
            .find(|slot| slot.active && slot.bound_text.as_deref() == Some(text))
    }

    /// Pool settings.
    #[must_use]
    pub const fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// The rendering backend.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }
}

/// Fraction of the remaining distance covered in `dt` seconds.
fn smoothing_alpha(rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Yaw-only rotation facing from `viewer` toward `position`.
///
/// `None` when the viewer is directly above or below.
fn billboard(position: Vec3, viewer: Vec3) -> Option<Quat> {
    let mut direction = position - viewer;
    direction.y = 0.0;
    Transform3D::try_look_rotation(direction, Vec3::Y)
}

/// The yaw component of `rotation`.
fn yaw_rotation(rotation: Quat) -> Quat {
    let mut forward = rotation * Vec3::Z;
    forward.y = 0.0;
    Transform3D::look_rotation(forward, Vec3::Y)
}
