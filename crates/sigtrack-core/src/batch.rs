use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::options::DecodeOptions;
use crate::payload::decode_with;
use crate::source::{LineSource, PayloadLine, PayloadSource, SourceError};
use crate::{
    BatchEntry, BatchReport, BatchSummary, DEFAULT_GENERATED_AT, EntryError, make_stub_report,
};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every payload line of a file.
pub fn decode_file(path: &Path, options: &DecodeOptions) -> Result<BatchReport, BatchError> {
    let source = LineSource::open(path)?;
    let mut report = decode_source(&path.display().to_string(), source, options)?;
    report.input.bytes = Some(path.metadata()?.len());
    Ok(report)
}

/// Decode every payload a source yields.
///
/// Each payload is decoded independently; a rejected payload becomes an
/// entry with an error and never stops the batch. Only source failures
/// abort.
pub fn decode_source<S: PayloadSource>(
    input_path: &str,
    mut source: S,
    options: &DecodeOptions,
) -> Result<BatchReport, BatchError> {
    let mut report = make_stub_report(input_path, None);
    report.options = *options;

    while let Some(PayloadLine { line, hex }) = source.next_payload()? {
        let entry = decode_entry(line, hex, options);
        add_entry_stats(&mut report.summary, &entry);
        report.entries.push(entry);
    }

    report.generated_at = now_rfc3339();
    debug!(
        total = report.summary.total,
        failed = report.summary.failed,
        "batch decoded"
    );
    Ok(report)
}

fn decode_entry(line: u64, hex: String, options: &DecodeOptions) -> BatchEntry {
    match decode_with(&hex, options) {
        Ok(payload) => BatchEntry {
            line,
            input: hex,
            payload: Some(payload),
            error: None,
        },
        Err(err) => {
            warn!(line, kind = err.kind(), %err, "payload rejected");
            BatchEntry {
                line,
                input: hex,
                payload: None,
                error: Some(EntryError {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                    field: err.field(),
                }),
            }
        }
    }
}

fn add_entry_stats(summary: &mut BatchSummary, entry: &BatchEntry) {
    summary.total += 1;
    match &entry.payload {
        Some(payload) => {
            summary.decoded += 1;
            summary.sources.record(payload.source);
        }
        None => summary.failed += 1,
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

#[cfg(test)]
mod tests {
    use super::decode_source;
    use crate::options::DecodeOptions;
    use crate::payload::error::Field;
    use crate::source::LineSource;

    #[test]
    fn failures_do_not_stop_the_batch() {
        let input = b"9e16411954000194897013130c0f\n9e\nxyz\n60\n20\n";
        let report =
            decode_source("memory", LineSource::new(&input[..]), &DecodeOptions::default())
                .unwrap();

        assert_eq!(report.summary.total, 5);
        assert_eq!(report.summary.decoded, 3);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.sources.periodic, 1);
        assert_eq!(report.summary.sources.accelerometer, 1);
        assert_eq!(report.summary.sources.button, 1);

        let truncated = &report.entries[1];
        assert_eq!(truncated.line, 2);
        let error = truncated.error.as_ref().unwrap();
        assert_eq!(error.kind, "truncated_payload");
        assert_eq!(error.field, Some(Field::Temperature));

        let malformed = report.entries[2].error.as_ref().unwrap();
        assert_eq!(malformed.kind, "invalid_format");
        assert_eq!(malformed.field, None);

        assert_eq!(report.entries[4].payload.as_ref().unwrap().temperature, None);
    }

    #[test]
    fn options_are_recorded_and_applied() {
        let options = DecodeOptions::default().with_strict(true);
        let report = decode_source("memory", LineSource::new(&b"01\n00\n"[..]), &options).unwrap();
        assert!(report.options.strict);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(
            report.entries[0].error.as_ref().unwrap().kind,
            "reserved_bit_set"
        );
        assert!(report.input.bytes.is_none());
    }

    #[test]
    fn empty_source_yields_empty_report() {
        let report =
            decode_source("memory", LineSource::new(&b""[..]), &DecodeOptions::default())
                .unwrap();
        assert_eq!(report.summary.total, 0);
        assert!(report.entries.is_empty());
        assert_ne!(report.generated_at, "");
    }
}
