use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use sigtrack_core::{BatchReport, BatteryField, DecodeError, DecodeOptions, DecodedPayload};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("SIGTRACK_BUILD_COMMIT"),
    ", ",
    env!("SIGTRACK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "sigtrack")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for Sigfox tracker payloads (flags byte + temperature / GPS / frame counters).",
    long_about = None,
    after_help = "Examples:\n  sigtrack decode 9e16411954000194897013130c0f\n  echo 9e16411954000194897013130c0f | sigtrack decode --format json\n  sigtrack batch uplinks.txt -o report.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    decoder: DecoderArgs,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct DecoderArgs {
    /// Reject payloads with the reserved flag bit 0 set
    #[arg(
        long,
        global = true,
        env = "SIGTRACK_STRICT",
        value_parser = FalseyValueParser::new()
    )]
    strict: bool,

    /// Read one battery-level byte after the frame counters when flag bit 1 is set
    #[arg(
        long,
        global = true,
        env = "SIGTRACK_BATTERY",
        value_parser = FalseyValueParser::new()
    )]
    battery: bool,
}

impl DecoderArgs {
    fn options(&self) -> DecodeOptions {
        let battery = if self.battery {
            BatteryField::Decode
        } else {
            BatteryField::Ignore
        };
        DecodeOptions::default()
            .with_strict(self.strict)
            .with_battery(battery)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single payload given as an argument or on standard input.
    #[command(
        after_help = "Text output prints one line per field, in order: source, temperature,\nlatitude, longitude, quality, uplink_counter, downlink_counter.\nAbsent fields print as empty lines."
    )]
    Decode {
        /// Hex payload; read from the first line of stdin when omitted
        payload: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Decode a file with one payload per line and generate a JSON report.
    #[command(
        after_help = "Examples:\n  sigtrack batch uplinks.txt -o report.json\n  sigtrack batch 'captures/*.txt' --stdout --pretty"
    )]
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Path (or single-match glob pattern) of a payload file
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any payload failed to decode
    #[arg(long)]
    fail_on_error: bool,

    /// List payloads that failed to decode after the batch
    #[arg(long)]
    list_failures: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = matches!(&cli.command, Commands::Batch(args) if args.quiet);
    init_logging(cli.verbose, quiet);
    let options = cli.decoder.options();

    let result = match cli.command {
        Commands::Decode {
            payload,
            format,
            pretty,
        } => cmd_decode(payload, format, pretty, &options),
        Commands::Batch(args) => cmd_batch(args, &options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<DecodeError> for CliError {
    fn from(err: DecodeError) -> Self {
        let hint = match &err {
            DecodeError::InvalidFormat(_) => {
                "payloads are even-length hex strings, e.g. 9e16411954000194897013130c0f"
            }
            DecodeError::TruncatedPayload { .. } => {
                "the flags byte announces more fields than the payload carries"
            }
            DecodeError::InvalidFieldEncoding { .. } => {
                "GPS degree and minute digits must be decimal"
            }
            DecodeError::ReservedBitSet { .. } => "drop --strict to accept payloads with bit 0 set",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    }
}

fn cmd_decode(
    payload: Option<String>,
    format: OutputFormat,
    pretty: bool,
    options: &DecodeOptions,
) -> Result<(), CliError> {
    let payload = match payload {
        Some(payload) => payload.trim().to_string(),
        None => read_stdin_payload()?,
    };
    if payload.is_empty() {
        return Err(CliError::new(
            "no payload given",
            Some("pass a hex payload as an argument or on stdin".to_string()),
        ));
    }

    let decoded = sigtrack_core::decode_with(&payload, options)?;
    let output = match format {
        OutputFormat::Text => render_text(&decoded, options),
        OutputFormat::Json => {
            let mut json = serialize_json(&decoded, pretty)?;
            json.push('\n');
            json
        }
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

fn read_stdin_payload() -> Result<String, CliError> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read payload from stdin")?;
    Ok(line.trim().to_string())
}

/// One line per field; absent fields are empty lines.
fn render_text(payload: &DecodedPayload, options: &DecodeOptions) -> String {
    let mut lines = vec![
        payload.source.to_string(),
        optional(payload.temperature),
        optional(payload.latitude),
        optional(payload.longitude),
        optional(payload.quality),
        optional(payload.uplink_counter),
        optional(payload.downlink_counter),
    ];
    if options.battery == BatteryField::Decode {
        lines.push(optional(payload.battery_level));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn serialize_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn cmd_batch(args: BatchArgs, options: &DecodeOptions) -> Result<(), CliError> {
    let BatchArgs {
        input,
        report,
        stdout,
        pretty,
        quiet,
        fail_on_error,
        list_failures,
    } = args;
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        let report_dir = match report_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent).ok(),
            _ => fs::canonicalize(".").ok(),
        };
        if let (Some(report_dir), Some(file_name)) = (report_dir, report_path.file_name()) {
            if report_dir.join(file_name) == input_abs {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    tracing::debug!(input = %resolved_input.display(), ?options, "decoding batch");
    let rep = sigtrack_core::decode_file(&resolved_input, options)
        .context("Batch decoding failed")?;
    let json = serialize_json(&rep, pretty)?;

    match report {
        None => {
            println!("{}", json);
        }
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !quiet {
                eprintln!(
                    "OK: {} decoded, {} failed -> {}",
                    rep.summary.decoded,
                    rep.summary.failed,
                    report.display()
                );
            }
        }
    }

    if list_failures && !quiet {
        print_failures(&rep);
    }
    if fail_on_error && rep.summary.failed > 0 {
        return Err(CliError::new(
            format!("{} payload(s) failed to decode", rep.summary.failed),
            Some("use --list-failures to inspect".to_string()),
        ));
    }
    Ok(())
}

fn print_failures(rep: &BatchReport) {
    eprintln!("Failed payloads:");
    for entry in &rep.entries {
        if let Some(error) = &entry.error {
            eprintln!("  line {} {} ({})", entry.line, error.kind, error.message);
        }
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a text file with one hex payload per line".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a text file with one hex payload per line".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single payload file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, is_glob_pattern, render_text};
    use clap::Parser;
    use sigtrack_core::{BatteryField, DecodeOptions, decode, decode_with};

    #[test]
    fn text_output_has_seven_lines_in_order() {
        let payload = decode("9e16411954000194897013130c0f").unwrap();
        let text = render_text(&payload, &DecodeOptions::default());
        assert_eq!(
            text,
            "Periodic\n22\n41.3257\n19.8162\n19\n19\n12\n"
        );
    }

    #[test]
    fn text_output_leaves_absent_fields_empty() {
        let payload = decode("60").unwrap();
        let text = render_text(&payload, &DecodeOptions::default());
        assert_eq!(text, "Accelerometer\n\n\n\n\n\n\n");
    }

    #[test]
    fn text_output_appends_battery_when_decoded() {
        let options = DecodeOptions::default().with_battery(BatteryField::Decode);
        let payload = decode_with("9e16411954000194897013130c0f", &options).unwrap();
        let text = render_text(&payload, &options);
        assert!(text.ends_with("\n12\n15\n"));
    }

    #[test]
    fn batch_arguments_are_grouped() {
        let cli = Cli::try_parse_from([
            "sigtrack",
            "batch",
            "uplinks.txt",
            "--stdout",
            "--quiet",
            "--list-failures",
        ])
        .unwrap();
        let Commands::Batch(args) = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(args.input.to_str(), Some("uplinks.txt"));
        assert!(args.stdout && args.quiet && args.list_failures);
        assert!(args.report.is_none());
        assert!(!args.pretty && !args.fail_on_error);
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.txt"));
        assert!(!is_glob_pattern("uplinks.txt"));
    }
}
