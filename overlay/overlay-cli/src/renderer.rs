//! Headless indicator renderer that keeps the visible scene in memory.

use std::collections::BTreeMap;

use barcode_overlay::{IndicatorHandle, IndicatorRenderer, IndicatorView};
use tracing::{debug, trace};

/// Tracks which indicators are visible and what they show.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    visible: BTreeMap<IndicatorHandle, IndicatorView>,
}

impl HeadlessRenderer {
    /// Visible indicators in handle order.
    pub fn visible(&self) -> impl Iterator<Item = (IndicatorHandle, &IndicatorView)> {
        self.visible.iter().map(|(handle, view)| (*handle, view))
    }
}

impl IndicatorRenderer for HeadlessRenderer {
    fn spawn(&mut self) -> IndicatorHandle {
        self.next_id += 1;
        IndicatorHandle::new(self.next_id)
    }

    fn show(&mut self, handle: IndicatorHandle, view: &IndicatorView) {
        if self.visible.insert(handle, view.clone()).is_none() {
            debug!(%handle, "Indicator shown");
        } else {
            trace!(%handle, position = ?view.position, "Indicator moved");
        }
    }

    fn hide(&mut self, handle: IndicatorHandle) {
        if self.visible.remove(&handle).is_some() {
            debug!(%handle, "Indicator hidden");
        }
    }
}
