use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sigtrack_core::{BatchError, DecodeOptions, LineSource, PayloadSource, decode_file};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

#[test]
fn line_source_reads_payloads_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("mixed")
        .join("input.txt");
    let mut source = LineSource::open(&path).unwrap();

    let mut payloads = 0;
    while let Some(_line) = source.next_payload().unwrap() {
        payloads += 1;
    }

    assert_eq!(payloads, 8);
}

#[test]
fn decode_file_reports_input_size() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("sigtrack_uplinks_{unique}.txt"));

    fs::write(&path, "80ff\n").unwrap();
    let report = decode_file(&path, &DecodeOptions::default());
    let _ = fs::remove_file(&path);

    let report = report.unwrap();
    assert_eq!(report.input.bytes, Some(5));
    assert_eq!(report.entries[0].payload.as_ref().unwrap().temperature, Some(255));
}

#[test]
fn decode_file_rejects_missing_file() {
    let path = repo_root().join("tests").join("golden").join("missing.txt");
    let err = match decode_file(&path, &DecodeOptions::default()) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };

    assert!(matches!(err, BatchError::Source(_)));
}
