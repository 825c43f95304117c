use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sigtrack_core::{BatchReport, DEFAULT_GENERATED_AT, DecodeOptions, decode_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.txt");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_report.json");
        let options = existing_options(&output)?;
        regenerate_one(&input, &output, &options)?;
    }

    Ok(())
}

/// Options are the one hand-written part of a golden report; keep them.
fn existing_options(output: &Path) -> Result<DecodeOptions, String> {
    if !output.exists() {
        return Ok(DecodeOptions::default());
    }
    let json = fs::read_to_string(output)
        .map_err(|err| format!("failed to read {}: {}", output.display(), err))?;
    let report: BatchReport = serde_json::from_str(&json)
        .map_err(|err| format!("invalid report {}: {}", output.display(), err))?;
    Ok(report.options)
}

fn regenerate_one(input: &Path, output: &Path, options: &DecodeOptions) -> Result<(), String> {
    let mut report = decode_file(input, options)
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    report.generated_at = DEFAULT_GENERATED_AT.to_string();
    report.input.path = input.display().to_string().replace('\\', "/");
    let mut json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    json.push('\n');
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
