//! Decoder detections and their wire format.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use sensor_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Symbology reported by the platform decoder.
///
/// Parsed from the decoder's format names (`"EAN_13"`, `"QR_CODE"`, ...).
/// Unrecognised names are kept verbatim in [`BarcodeFormat::Other`].
///
/// ```
/// use barcode_overlay::BarcodeFormat;
///
/// let f: BarcodeFormat = "EAN_13".parse().unwrap();
/// assert_eq!(f, BarcodeFormat::Ean13);
/// assert!(f.is_linear());
/// assert_eq!(f.to_string(), "EAN_13");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BarcodeFormat {
    /// QR Code.
    QrCode,
    /// UPC-A.
    UpcA,
    /// UPC-E.
    UpcE,
    /// EAN-13.
    Ean13,
    /// EAN-8.
    Ean8,
    /// Code 39.
    Code39,
    /// Code 93.
    Code93,
    /// Code 128.
    Code128,
    /// Interleaved 2 of 5.
    Itf,
    /// Data Matrix.
    DataMatrix,
    /// Aztec.
    Aztec,
    /// PDF417.
    Pdf417,
    /// Format not reported.
    #[default]
    Unknown,
    /// Any other decoder format name.
    Other(String),
}

impl BarcodeFormat {
    /// Returns true for one-dimensional symbologies, whose two reported
    /// points are the ends of the scan line.
    #[must_use]
    pub const fn is_linear(&self) -> bool {
        matches!(
            self,
            Self::UpcA
                | Self::UpcE
                | Self::Ean13
                | Self::Ean8
                | Self::Code39
                | Self::Code93
                | Self::Code128
                | Self::Itf
        )
    }

    /// The decoder's name for this format.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::QrCode => "QR_CODE",
            Self::UpcA => "UPC_A",
            Self::UpcE => "UPC_E",
            Self::Ean13 => "EAN_13",
            Self::Ean8 => "EAN_8",
            Self::Code39 => "CODE_39",
            Self::Code93 => "CODE_93",
            Self::Code128 => "CODE_128",
            Self::Itf => "ITF",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Aztec => "AZTEC",
            Self::Pdf417 => "PDF_417",
            Self::Unknown => "",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for BarcodeFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "QR_CODE" => Self::QrCode,
            "UPC_A" => Self::UpcA,
            "UPC_E" => Self::UpcE,
            "EAN_13" => Self::Ean13,
            "EAN_8" => Self::Ean8,
            "CODE_39" => Self::Code39,
            "CODE_93" => Self::Code93,
            "CODE_128" => Self::Code128,
            "ITF" => Self::Itf,
            "DATA_MATRIX" => Self::DataMatrix,
            "AZTEC" => Self::Aztec,
            "PDF_417" => Self::Pdf417,
            "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for BarcodeFormat {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl From<BarcodeFormat> for String {
    fn from(format: BarcodeFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded barcode as reported by the platform decoder.
///
/// Immutable once produced. `points` always holds at least two entries;
/// the ingest stage drops anything shorter.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    /// Decoded barcode text.
    pub text: String,
    /// Pixel positions in the captured frame, top-left origin.
    pub points: Vec<Vec2>,
    /// When the frame was captured.
    pub timestamp: Timestamp,
    /// Reported symbology.
    pub format: BarcodeFormat,
}

impl DetectionEvent {
    /// The first two points: the ends of the scan line.
    #[must_use]
    pub fn segment(&self) -> Option<(Vec2, Vec2)> {
        match self.points.as_slice() {
            [start, end, ..] => Some((*start, *end)),
            _ => None,
        }
    }
}

/// Wire payload: `{ "results": [ ... ] }`.
///
/// Every field is optional on the wire, matching the decoder bridge, which
/// omits null fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirePayload {
    /// Decoded results in this message.
    #[serde(default)]
    pub results: Vec<WireResult>,
}

/// One wire result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireResult {
    /// Decoded text.
    #[serde(default)]
    pub text: String,
    /// Pixel points.
    #[serde(default)]
    pub points: Vec<WirePoint>,
    /// Capture time in nanoseconds.
    #[serde(default)]
    pub timestamp: i64,
    /// Decoder format name.
    #[serde(default)]
    pub format: String,
}

/// One wire pixel point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WirePoint {
    /// Pixel column.
    pub x: f32,
    /// Pixel row.
    pub y: f32,
}

impl WireResult {
    /// Validates a wire result into a [`DetectionEvent`].
    ///
    /// Returns `None` for empty text, fewer than two points, non-finite
    /// points or a negative timestamp.
    #[must_use]
    pub fn into_event(self) -> Option<DetectionEvent> {
        if self.text.is_empty() || self.points.len() < 2 {
            return None;
        }
        let timestamp = Timestamp::from_signed_nanos(self.timestamp)?;
        let points: Vec<Vec2> = self.points.iter().map(|p| Vec2::new(p.x, p.y)).collect();
        if !points.iter().all(|p| p.is_finite()) {
            return None;
        }
        Some(DetectionEvent {
            text: self.text,
            points,
            timestamp,
            format: self.format.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn wire(text: &str, points: &[(f32, f32)], timestamp: i64) -> WireResult {
        WireResult {
            text: text.to_string(),
            points: points.iter().map(|&(x, y)| WirePoint { x, y }).collect(),
            timestamp,
            format: "EAN_13".to_string(),
        }
    }

    #[test]
    fn format_names_roundtrip() {
        for name in ["QR_CODE", "UPC_A", "EAN_8", "CODE_128", "PDF_417", "MAXICODE"] {
            let format: BarcodeFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), name);
        }
        assert_eq!(
            "MAXICODE".parse::<BarcodeFormat>().unwrap(),
            BarcodeFormat::Other("MAXICODE".into())
        );
    }

    #[test]
    fn format_linear_vs_matrix() {
        assert!(BarcodeFormat::Code39.is_linear());
        assert!(!BarcodeFormat::QrCode.is_linear());
        assert!(!BarcodeFormat::DataMatrix.is_linear());
        assert!(!BarcodeFormat::Unknown.is_linear());
    }

    #[test]
    fn into_event_accepts_valid() {
        let event = wire("123", &[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)], 7)
            .into_event()
            .unwrap();
        assert_eq!(event.text, "123");
        assert_eq!(event.timestamp, Timestamp::from_nanos(7));
        assert_eq!(event.format, BarcodeFormat::Ean13);
        let (start, end) = event.segment().unwrap();
        assert_eq!(start, Vec2::new(1.0, 2.0));
        assert_eq!(end, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn into_event_rejects_short_or_bad() {
        assert!(wire("123", &[(1.0, 2.0)], 0).into_event().is_none());
        assert!(wire("123", &[], 0).into_event().is_none());
        assert!(wire("", &[(1.0, 2.0), (3.0, 4.0)], 0).into_event().is_none());
        assert!(wire("123", &[(1.0, 2.0), (3.0, 4.0)], -5).into_event().is_none());
        assert!(wire("123", &[(f32::NAN, 2.0), (3.0, 4.0)], 0).into_event().is_none());
    }

    #[test]
    fn payload_missing_fields_default() {
        let payload: WirePayload =
            serde_json::from_str(r#"{"results":[{"text":"9","points":[{"x":1,"y":2},{"x":3,"y":4}]}]}"#)
                .unwrap();
        let event = payload.results[0].clone().into_event().unwrap();
        assert_eq!(event.format, BarcodeFormat::Unknown);
        assert_eq!(event.timestamp, Timestamp::zero());
    }
}
