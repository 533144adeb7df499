//! Detection ingest: decoder payloads in, validated detection batches out.
//!
//! The platform decoder delivers JSON on its own callback thread. It posts
//! into a [`DetectionMailbox`]; the render tick takes the latest payload and
//! hands it to a [`DetectionReader`], which keeps the last good batch so a
//! bad or missing message never blanks the overlay.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use overlay_catalog::{ProductCatalog, ProductRecord};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::detection::{DetectionEvent, WireResult};

/// Result of one ingest call.
#[derive(Debug, Clone, Copy)]
pub struct IngestedBatch<'a> {
    /// The current batch: freshly parsed, or the cached last good one.
    pub events: &'a [DetectionEvent],
    /// True when `events` came from the payload passed to this call.
    pub fresh: bool,
}

/// A detection whose text names a catalog product.
#[derive(Debug, Clone, Copy)]
pub struct KnownProductSighting<'a> {
    /// The detection.
    pub event: &'a DetectionEvent,
    /// The matching product.
    pub product: &'a ProductRecord,
}

/// Parses decoder payloads and caches the last good batch.
#[derive(Debug, Clone, Default)]
pub struct DetectionReader {
    last_good: Vec<DetectionEvent>,
}

impl DetectionReader {
    /// Creates a reader with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests the payload received since the last tick, if any.
    ///
    /// A payload that fails to parse, or that has no usable detections,
    /// leaves the cache untouched and returns it with `fresh = false`.
    pub fn ingest(&mut self, payload: Option<&str>) -> IngestedBatch<'_> {
        let fresh = match payload.map(parse_payload) {
            None => false,
            Some(Ok(events)) if events.is_empty() => {
                debug!("Decoder payload had no usable detections, keeping last batch");
                false
            }
            Some(Ok(events)) => {
                trace!(count = events.len(), "Ingested detection batch");
                self.last_good = events;
                true
            }
            Some(Err(e)) => {
                debug!(error = %e, "Malformed decoder payload, keeping last batch");
                false
            }
        };
        IngestedBatch {
            events: &self.last_good,
            fresh,
        }
    }

    /// The cached batch.
    #[must_use]
    pub fn last_batch(&self) -> &[DetectionEvent] {
        &self.last_good
    }

    /// Drops the cached batch.
    pub fn clear(&mut self) {
        self.last_good.clear();
    }

    /// One sighting per event whose text is a catalog hit, in event order.
    #[must_use]
    pub fn known_products<'a>(
        events: &'a [DetectionEvent],
        catalog: &'a ProductCatalog,
    ) -> Vec<KnownProductSighting<'a>> {
        events
            .iter()
            .filter_map(|event| {
                catalog.lookup(&event.text).map(|product| {
                    debug!(text = %event.text, name = %product.name, "Known product sighted");
                    KnownProductSighting { event, product }
                })
            })
            .collect()
    }
}

/// Payload envelope whose results are decoded one at a time.
#[derive(Debug, Deserialize)]
struct LenientPayload {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Parses a wire payload into a batch of unique detections.
///
/// Results that fail to decode or validate are dropped individually. A text
/// reported more than once keeps its first occurrence.
///
/// # Errors
///
/// Returns the JSON error when the payload is not a `{"results": [...]}`
/// message.
pub fn parse_payload(json: &str) -> serde_json::Result<Vec<DetectionEvent>> {
    let payload: LenientPayload = serde_json::from_str(json)?;
    let total = payload.results.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut events = Vec::with_capacity(total);
    let mut invalid = 0usize;

    for value in payload.results {
        let event = match serde_json::from_value::<WireResult>(value) {
            Ok(result) => result.into_event(),
            Err(e) => {
                debug!(error = %e, "Undecodable detection result");
                None
            }
        };
        let Some(event) = event else {
            invalid += 1;
            continue;
        };
        if seen.contains(event.text.as_str()) {
            trace!(text = %event.text, "Duplicate detection in batch");
            continue;
        }
        seen.insert(event.text.clone());
        events.push(event);
    }

    if invalid > 0 {
        trace!(dropped = invalid, "Dropped invalid detections");
    }
    Ok(events)
}

#[derive(Debug)]
struct MailboxInner {
    pending: Mutex<Option<String>>,
    enabled: AtomicBool,
}

/// Single-slot handoff from the decoder callback thread to the tick.
///
/// Cloning shares the slot. The last post before a tick wins.
///
/// ```
/// use barcode_overlay::DetectionMailbox;
///
/// let mailbox = DetectionMailbox::new();
/// let decoder = mailbox.clone();
/// decoder.post(r#"{"results":[]}"#);
/// decoder.post(r#"{"results":[{"text":"1"}]}"#);
/// assert_eq!(mailbox.take().as_deref(), Some(r#"{"results":[{"text":"1"}]}"#));
/// assert!(mailbox.take().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DetectionMailbox {
    inner: Arc<MailboxInner>,
}

impl Default for DetectionMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionMailbox {
    /// Creates an enabled, empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                pending: Mutex::new(None),
                enabled: AtomicBool::new(true),
            }),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Posts a payload, replacing any not yet taken.
    ///
    /// Returns false when the mailbox is disabled and the payload was
    /// dropped.
    pub fn post(&self, json: impl Into<String>) -> bool {
        if !self.is_enabled() {
            trace!("Mailbox disabled, dropping decoder payload");
            return false;
        }
        *self.slot() = Some(json.into());
        true
    }

    /// Takes the pending payload, if any.
    #[must_use]
    pub fn take(&self) -> Option<String> {
        self.slot().take()
    }

    /// Enables or disables delivery. Disabling discards a pending payload.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.slot().take();
        }
    }

    /// Whether posts are currently accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Stops delivery for good on shutdown.
    pub fn close(&self) {
        debug!("Detection mailbox closed");
        self.set_enabled(false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use overlay_catalog::ProductRecord;

    const ONE: &str = r#"{"results":[{"text":"1234567890123","points":[{"x":100,"y":200},{"x":300,"y":200}],"timestamp":0,"format":"EAN_13"}]}"#;
    const TWO: &str = r#"{"results":[{"text":"9999","points":[{"x":1,"y":2},{"x":3,"y":4}],"timestamp":5}]}"#;

    #[test]
    fn ingest_fresh_payload() {
        let mut reader = DetectionReader::new();
        let batch = reader.ingest(Some(ONE));
        assert!(batch.fresh);
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].text, "1234567890123");
    }

    #[test]
    fn ingest_none_reemits_cache() {
        let mut reader = DetectionReader::new();
        reader.ingest(Some(ONE));
        let batch = reader.ingest(None);
        assert!(!batch.fresh);
        assert_eq!(batch.events.len(), 1);
    }

    #[test]
    fn malformed_payload_keeps_cache() {
        let mut reader = DetectionReader::new();
        reader.ingest(Some(ONE));
        for bad in ["not json", "{\"results\": 3}", "{\"results\":[]}", ""] {
            let batch = reader.ingest(Some(bad));
            assert!(!batch.fresh, "{bad:?} should not be fresh");
            assert_eq!(batch.events[0].text, "1234567890123");
        }
    }

    #[test]
    fn all_invalid_payload_keeps_cache() {
        let mut reader = DetectionReader::new();
        reader.ingest(Some(ONE));
        let batch = reader.ingest(Some(r#"{"results":[{"text":"5","points":[{"x":1,"y":1}]}]}"#));
        assert!(!batch.fresh);
        assert_eq!(batch.events[0].text, "1234567890123");
    }

    #[test]
    fn new_payload_replaces_cache() {
        let mut reader = DetectionReader::new();
        reader.ingest(Some(ONE));
        let batch = reader.ingest(Some(TWO));
        assert!(batch.fresh);
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].text, "9999");
    }

    #[test]
    fn single_point_results_are_dropped() {
        let events = parse_payload(
            r#"{"results":[
                {"text":"a","points":[{"x":1,"y":1}]},
                {"text":"b","points":[{"x":1,"y":1},{"x":2,"y":2}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "b");
    }

    #[test]
    fn repeated_text_keeps_first_occurrence() {
        let events = parse_payload(
            r#"{"results":[
                {"text":"7","points":[{"x":1,"y":1},{"x":2,"y":2}],"timestamp":10},
                {"text":"8","points":[{"x":1,"y":1},{"x":2,"y":2}],"timestamp":10},
                {"text":"7","points":[{"x":5,"y":5},{"x":6,"y":6}],"timestamp":20}
            ]}"#,
        )
        .unwrap();
        let texts: Vec<_> = events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["7", "8"]);
        assert_eq!(events[0].timestamp.as_nanos(), 10);
    }

    #[test]
    fn undecodable_result_drops_only_itself() {
        let events = parse_payload(
            r#"{"results":[
                {"text":"good","points":[{"x":1,"y":1},{"x":2,"y":2}]},
                {"points":[{"x":1}]},
                {"text":"bad","points":"nope"},
                42
            ]}"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "good");
    }

    #[test]
    fn partly_broken_payload_is_fresh() {
        let mut reader = DetectionReader::new();
        reader.ingest(Some(ONE));
        let batch = reader.ingest(Some(
            r#"{"results":[{"text":"9999","points":[{"x":1,"y":2},{"x":3,"y":4}]},{"points":[{"x":1}]}]}"#,
        ));
        assert!(batch.fresh);
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].text, "9999");
    }

    #[test]
    fn known_products_only_for_catalog_hits() {
        let catalog =
            ProductCatalog::from_records([ProductRecord::new("9999", "Thing", 1.0)]).unwrap();
        let events = parse_payload(
            r#"{"results":[
                {"text":"0000","points":[{"x":1,"y":1},{"x":2,"y":2}]},
                {"text":"9999","points":[{"x":1,"y":1},{"x":2,"y":2}]}
            ]}"#,
        )
        .unwrap();
        let hits = DetectionReader::known_products(&events, &catalog);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event.text, "9999");
        assert_eq!(hits[0].product.name, "Thing");
    }

    #[test]
    fn mailbox_last_writer_wins() {
        let mailbox = DetectionMailbox::new();
        assert!(mailbox.post(ONE));
        assert!(mailbox.post(TWO));
        assert_eq!(mailbox.take().as_deref(), Some(TWO));
        assert!(mailbox.take().is_none());
    }

    #[test]
    fn mailbox_disabled_drops_posts() {
        let mailbox = DetectionMailbox::new();
        mailbox.post(ONE);
        mailbox.set_enabled(false);
        assert!(mailbox.take().is_none());
        assert!(!mailbox.post(TWO));
        assert!(mailbox.take().is_none());

        mailbox.set_enabled(true);
        assert!(mailbox.post(TWO));
        assert_eq!(mailbox.take().as_deref(), Some(TWO));
    }

    #[test]
    fn mailbox_close_is_final_for_clones() {
        let mailbox = DetectionMailbox::new();
        let decoder = mailbox.clone();
        mailbox.close();
        assert!(!decoder.post(ONE));
        assert!(!decoder.is_enabled());
    }

    #[test]
    fn mailbox_recovers_from_poisoned_lock() {
        let mailbox = DetectionMailbox::new();
        let decoder = mailbox.clone();
        let _ = std::thread::spawn(move || {
            let _guard = decoder.inner.pending.lock().unwrap();
            panic!("decoder thread died");
        })
        .join();
        assert!(mailbox.post(ONE));
        assert_eq!(mailbox.take().as_deref(), Some(ONE));
    }

    #[test]
    fn mailbox_across_threads() {
        let mailbox = DetectionMailbox::new();
        let decoder = mailbox.clone();
        std::thread::spawn(move || {
            decoder.post(ONE);
        })
        .join()
        .unwrap();
        assert_eq!(mailbox.take().as_deref(), Some(ONE));
    }
}
