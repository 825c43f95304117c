use std::fs;
use std::path::Path;

use sigtrack_core::{BatchReport, decode_file};

fn load_expected_report(dir: &str) -> BatchReport {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let expected_path = root.join(dir).join("expected_report.json");

    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let input = root.join(dir).join("input.txt");
    let expected = load_expected_report(dir);

    let mut actual = decode_file(&input, &expected.options).expect("decode batch");
    actual.generated_at = expected.generated_at.clone();
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_reference() {
    run_golden("tests/golden/reference");
}

#[test]
fn golden_mixed() {
    run_golden("tests/golden/mixed");
}

#[test]
fn golden_battery() {
    run_golden("tests/golden/battery");
}

#[test]
fn golden_strict() {
    run_golden("tests/golden/strict");
}

#[test]
fn golden_reference_pins_decoded_values() {
    let report = load_expected_report("tests/golden/reference");
    let payload = report.entries[0].payload.as_ref().expect("payload");
    assert_eq!(payload.temperature, Some(22));
    assert_eq!(payload.latitude.map(|c| c.to_string()).as_deref(), Some("41.3257"));
    assert_eq!(payload.longitude.map(|c| c.to_string()).as_deref(), Some("19.8162"));
    assert_eq!(payload.quality, Some(19));
    assert_eq!(payload.uplink_counter, Some(19));
    assert_eq!(payload.downlink_counter, Some(12));
}

#[test]
fn golden_mixed_keeps_line_numbers() {
    let report = load_expected_report("tests/golden/mixed");
    let lines: Vec<u64> = report.entries.iter().map(|entry| entry.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 6, 7, 8, 9, 10]);
    assert_eq!(report.summary.failed, 4);
}
