//! sigtrack core library: decoder for Sigfox tracker payloads.
//!
//! A tracker uplink is a short hex string. Its first byte is a set of flags
//! announcing which optional fields follow (temperature, GPS fix, frame
//! counters) and what triggered the transmission. [`decode`] turns one such
//! string into a [`DecodedPayload`]; [`decode_file`] and [`decode_source`]
//! run the decoder over a file of payloads and aggregate the outcome into a
//! [`BatchReport`].
//!
//! Decoding is pure: no I/O, no shared state. All file access lives in
//! `source`.
//!
//! Invariants:
//! - Fields are read strictly left to right; each advances the cursor by its
//!   fixed width.
//! - Absent fields are `None`, never zero.
//! - One failed payload never affects the next.
//!
//! # Examples
//! ```
//! use sigtrack_core::{Source, decode};
//!
//! let payload = decode("9e16411954000194897013130c0f")?;
//! assert_eq!(payload.source, Source::Periodic);
//! assert_eq!(payload.temperature, Some(22));
//! assert_eq!(payload.downlink_counter, Some(12));
//! # Ok::<(), sigtrack_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};

mod batch;
mod options;
mod payload;
mod source;

pub use batch::{BatchError, decode_file, decode_source};
pub use options::{BatteryField, DecodeOptions};
pub use payload::error::{DecodeError, Field, FormatViolation};
pub use payload::flags::{Flags, Source};
pub use payload::gps::Coordinate;
pub use payload::{DecodedPayload, decode, decode_with};
pub use source::{LineSource, PayloadLine, PayloadSource, SourceError};

/// Current batch report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the clock cannot be formatted.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Outcome of decoding every payload of one input.
///
/// # Examples
/// ```
/// use sigtrack_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.txt", Some(64));
/// assert_eq!(report.report_version, sigtrack_core::REPORT_VERSION);
/// assert!(report.entries.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of report generation.
    pub generated_at: String,
    pub input: InputInfo,
    /// Decoder options the batch ran with.
    pub options: DecodeOptions,
    pub summary: BatchSummary,
    /// One entry per payload line, in input order.
    pub entries: Vec<BatchEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes, when read from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

/// Batch totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: u64,
    pub decoded: u64,
    pub failed: u64,
    /// Transmission triggers of the decoded payloads.
    pub sources: SourceCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCounts {
    pub accelerometer: u64,
    pub button: u64,
    pub periodic: u64,
}

impl SourceCounts {
    pub fn record(&mut self, source: Source) {
        match source {
            Source::Accelerometer => self.accelerometer += 1,
            Source::Button => self.button += 1,
            Source::Periodic => self.periodic += 1,
        }
    }
}

/// One decoded (or rejected) payload line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// 1-based line number in the input.
    pub line: u64,
    /// Payload as read, whitespace trimmed.
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<DecodedPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EntryError>,
}

/// Decode failure recorded in a batch entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryError {
    /// Stable identifier, see [`DecodeError::kind`].
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

/// Build a report with base fields filled and no entries.
pub fn make_stub_report(input_path: &str, input_bytes: Option<u64>) -> BatchReport {
    BatchReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "sigtrack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        options: DecodeOptions::default(),
        summary: BatchSummary::default(),
        entries: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_omits_payload_or_error_when_none() {
        let report = BatchReport {
            entries: vec![
                BatchEntry {
                    line: 1,
                    input: "20".to_string(),
                    payload: Some(decode("20").expect("decode")),
                    error: None,
                },
                BatchEntry {
                    line: 2,
                    input: "9e".to_string(),
                    payload: None,
                    error: Some(EntryError {
                        kind: "truncated_payload".to_string(),
                        message: "payload truncated".to_string(),
                        field: Some(Field::Temperature),
                    }),
                },
            ],
            ..make_stub_report("uplinks.txt", None)
        };

        let value = serde_json::to_value(&report).expect("report json");
        assert!(value["input"].get("bytes").is_none());

        let ok = &value["entries"][0];
        assert!(ok.get("error").is_none());
        assert_eq!(ok["payload"]["source"], "Button");
        assert!(ok["payload"]["temperature"].is_null());

        let failed = &value["entries"][1];
        assert!(failed.get("payload").is_none());
        assert_eq!(failed["error"]["field"], "temperature");
    }

    #[test]
    fn source_counts_record_each_trigger() {
        let mut counts = SourceCounts::default();
        counts.record(Source::Button);
        counts.record(Source::Button);
        counts.record(Source::Periodic);
        assert_eq!(counts.button, 2);
        assert_eq!(counts.periodic, 1);
        assert_eq!(counts.accelerometer, 0);
    }
}
