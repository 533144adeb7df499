//! Product indicators anchored to barcodes in mixed reality.
//!
//! A platform decoder reads barcodes from the passthrough camera and posts
//! JSON batches. Each render tick this crate:
//!
//! 1. takes the newest batch from the [`DetectionMailbox`] and validates it
//!    ([`DetectionReader`]), re-using the last good batch when nothing new
//!    or nothing valid arrived,
//! 2. lifts each detection into world space at a fixed virtual depth using
//!    the head pose from its capture instant ([`Localizer`]),
//! 3. binds known products to pooled indicators, smooths them toward their
//!    targets and hides the ones not seen for a while ([`IndicatorPool`]).
//!
//! [`OverlayPipeline`] wires the three together.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use barcode_overlay::{
//!     FrameInput, IndicatorHandle, IndicatorRenderer, IndicatorView, OverlayConfig, OverlayPipeline,
//! };
//! use overlay_catalog::ProductCatalog;
//! use sensor_fusion::Transform3D;
//! use sensor_types::{FrameSize, Timestamp};
//!
//! #[derive(Default)]
//! struct NullRenderer(u64);
//!
//! impl IndicatorRenderer for NullRenderer {
//!     fn spawn(&mut self) -> IndicatorHandle {
//!         self.0 += 1;
//!         IndicatorHandle::new(self.0)
//!     }
//!     fn show(&mut self, _: IndicatorHandle, _: &IndicatorView) {}
//!     fn hide(&mut self, _: IndicatorHandle) {}
//! }
//!
//! let catalog = Arc::new(ProductCatalog::builtin());
//! let mut pipeline =
//!     OverlayPipeline::new(&OverlayConfig::default(), catalog, NullRenderer::default()).unwrap();
//!
//! pipeline.mailbox().post(
//!     r#"{"results":[{"text":"1234567890123","points":[{"x":100,"y":200},{"x":300,"y":200}],"timestamp":0}]}"#,
//! );
//!
//! let input = FrameInput {
//!     now: Timestamp::zero(),
//!     viewer: Transform3D::identity(),
//!     frame: FrameSize::new(1280, 960),
//! };
//! let report = pipeline.tick(&input, &|_: f64| Some(Transform3D::identity()));
//! assert_eq!(report.active_indicators, 1);
//! assert_eq!(report.known_products[0].product.name, "Whole Milk");
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod detection;
mod error;
mod indicator;
mod ingest;
mod pipeline;
mod tracker;

pub use config::{IndicatorConfig, OverlayConfig, PoseHistoryConfig, TrackerConfig};
pub use detection::{BarcodeFormat, DetectionEvent, WirePayload, WirePoint, WireResult};
pub use error::{OverlayError, Result};
pub use indicator::{
    IndicatorHandle, IndicatorLabel, IndicatorPool, IndicatorRenderer, IndicatorSlot, IndicatorView,
};
pub use ingest::{DetectionMailbox, DetectionReader, IngestedBatch, KnownProductSighting, parse_payload};
pub use pipeline::{FrameInput, OverlayPipeline, TickReport};
pub use tracker::{Localizer, TrackedBarcode};
