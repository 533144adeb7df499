//! Per-tick wiring: ingest, localize, update indicators.

use std::sync::Arc;

use overlay_catalog::{PreferenceSet, ProductCatalog};
use sensor_fusion::{PoseSource, Transform3D};
use sensor_types::{FrameSize, Timestamp};
use tracing::trace;

use crate::config::OverlayConfig;
use crate::error::Result;
use crate::indicator::{IndicatorPool, IndicatorRenderer};
use crate::ingest::{DetectionMailbox, DetectionReader, KnownProductSighting};
use crate::tracker::{Localizer, TrackedBarcode};

/// Inputs sampled at the start of a render tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Tick time on the capture clock.
    pub now: Timestamp,
    /// Current viewer head pose.
    pub viewer: Transform3D,
    /// Size of the frames the decoder is reading.
    pub frame: FrameSize,
}

/// What one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport<'a> {
    /// Barcodes localized this tick.
    pub tracked: Vec<TrackedBarcode>,
    /// Catalog hits in a freshly received batch. Empty on re-emitted batches.
    pub known_products: Vec<KnownProductSighting<'a>>,
    /// Indicators visible after the update.
    pub active_indicators: usize,
    /// Whether a new decoder batch arrived this tick.
    pub fresh_batch: bool,
}

/// The whole overlay: decoder mailbox to indicators.
///
/// Run [`OverlayPipeline::tick`] once per rendered frame. Hand
/// [`OverlayPipeline::mailbox`] to the decoder callback.
#[derive(Debug)]
pub struct OverlayPipeline<R> {
    mailbox: DetectionMailbox,
    reader: DetectionReader,
    localizer: Localizer,
    indicators: IndicatorPool<R>,
    catalog: Arc<ProductCatalog>,
    preferences: PreferenceSet,
}

impl<R: IndicatorRenderer> OverlayPipeline<R> {
    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`](crate::OverlayError::InvalidConfig)
    /// when the config fails validation.
    pub fn new(config: &OverlayConfig, catalog: Arc<ProductCatalog>, renderer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mailbox: DetectionMailbox::new(),
            reader: DetectionReader::new(),
            localizer: Localizer::new(config.tracker)?,
            indicators: IndicatorPool::new(renderer, config.indicators, Arc::clone(&catalog)),
            catalog,
            preferences: config.preferences.clone(),
        })
    }

    /// A handle for the decoder thread to post payloads into.
    #[must_use]
    pub fn mailbox(&self) -> DetectionMailbox {
        self.mailbox.clone()
    }

    /// Replaces the enabled dietary preferences.
    pub fn set_preferences(&mut self, preferences: PreferenceSet) {
        self.preferences = preferences;
    }

    /// Enabled dietary preferences.
    #[must_use]
    pub const fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    /// Runs one tick.
    pub fn tick<P>(&mut self, input: &FrameInput, poses: &P) -> TickReport<'_>
    where
        P: PoseSource + ?Sized,
    {
        let payload = self.mailbox.take();
        let batch = self.reader.ingest(payload.as_deref());

        let known_products = if batch.fresh {
            DetectionReader::known_products(batch.events, &self.catalog)
        } else {
            Vec::new()
        };

        let tracked = self
            .localizer
            .localize_recent(batch.events, input.frame, poses, input.now);
        self.indicators.update(
            &tracked,
            input.now,
            input.viewer.translation,
            &self.preferences,
        );
        let active_indicators = self.indicators.active_count();

        trace!(
            tracked = tracked.len(),
            known = known_products.len(),
            active = active_indicators,
            "Overlay tick"
        );

        TickReport {
            tracked,
            known_products,
            active_indicators,
            fresh_batch: batch.fresh,
        }
    }

    /// Hides all indicators and closes the mailbox.
    pub fn shutdown(&mut self) {
        self.mailbox.close();
        self.reader.clear();
        self.indicators.hide_all();
    }

    /// The indicator pool.
    #[must_use]
    pub const fn indicators(&self) -> &IndicatorPool<R> {
        &self.indicators
    }

    /// The localizer.
    #[must_use]
    pub const fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }
}
