//! Embeds the commit and commit date shown by `sigtrack --version`.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";
const SHORT_COMMIT_LEN: usize = 7;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let commit = ci_commit()
        .or_else(|| git(&["rev-parse", "--short=7", "HEAD"]))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let date = git(&["log", "-1", "--format=%cs"]).unwrap_or_else(|| UNKNOWN.to_string());

    println!("cargo:rustc-env=SIGTRACK_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=SIGTRACK_BUILD_DATE={date}");
}

/// Commit announced by the CI runner, shortened.
fn ci_commit() -> Option<String> {
    let sha = env::var("GITHUB_SHA").ok()?;
    let sha = sha.trim();
    if sha.is_empty() {
        return None;
    }
    Some(sha.chars().take(SHORT_COMMIT_LEN).collect())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
