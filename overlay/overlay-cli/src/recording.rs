//! JSON-lines recordings of a session.
//!
//! Each line is one rendered frame:
//!
//! ```text
//! {"t_ns": 16000000, "head": {"rotation": [0, 0, 0, 1], "translation": [0, 1.6, 0]}, "payload": {"results": [...]}}
//! ```
//!
//! `head` is the viewer pose at `t_ns`. `payload` is the decoder message
//! that arrived since the previous frame, if any, either as a JSON object or
//! as the raw string the decoder posted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use sensor_fusion::Transform3D;
use serde::Deserialize;
use serde_json::Value;

/// One recorded frame.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedFrame {
    /// Frame time in nanoseconds.
    pub t_ns: u64,
    /// Viewer head pose at `t_ns`.
    #[serde(default)]
    pub head: Transform3D,
    /// Decoder message received before this frame.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl RecordedFrame {
    /// The payload as the decoder would have posted it.
    pub fn payload_json(&self) -> Option<String> {
        match self.payload.as_ref()? {
            Value::Null => None,
            Value::String(raw) => Some(raw.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Parses a recording from any line source. Blank lines and `#` comments
/// are skipped.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<RecordedFrame>> {
    let mut frames: Vec<RecordedFrame> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("reading line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let frame: RecordedFrame =
            serde_json::from_str(trimmed).with_context(|| format!("parsing line {line_no}"))?;
        if let Some(prev) = frames.last() {
            if frame.t_ns < prev.t_ns {
                bail!("line {line_no}: time goes backwards ({} < {})", frame.t_ns, prev.t_ns);
            }
        }
        frames.push(frame);
    }
    Ok(frames)
}

/// Reads a recording file.
pub fn load(path: &Path) -> Result<Vec<RecordedFrame>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse(BufReader::new(file)).with_context(|| format!("in {}", path.display()))
}
