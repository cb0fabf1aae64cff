use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use pumplog_core::{DecodeOptions, HistoryReport, InputFormat, MalformedPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pumplog")]
#[command(version)]
#[command(
    about = "Offline decoder for insulin pump history-log records.",
    long_about = None,
    after_help = "Examples:\n  pumplog history decode page.hex -o report.json\n  pumplog history decode page.bin --stdout --pretty\n  pumplog history decode page.hex --text"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on history-log dumps (raw bytes or hex text).
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// Decode a history dump and generate a versioned JSON report.
    #[command(
        after_help = "Examples:\n  pumplog history decode page.hex -o report.json\n  pumplog history decode page.bin --stdout --strict"
    )]
    Decode {
        /// Path to a .bin, .hex or .txt history dump
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present_any = ["stdout", "text"])]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Print one summary line per record instead of JSON
        #[arg(long, conflicts_with_all = ["report", "stdout"])]
        text: bool,

        /// Input encoding (auto picks from the file extension)
        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with_all = ["compact", "text"])]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long, conflicts_with = "text")]
        compact: bool,

        /// Order records by timestamp instead of stream order
        #[arg(long)]
        sort: bool,

        /// Fail on the first malformed record instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Auto,
    Binary,
    Hex,
}

struct DecodeArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    text: bool,
    format: FormatArg,
    pretty: bool,
    compact: bool,
    sort: bool,
    strict: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::History { command } => match command {
            HistoryCommands::Decode {
                input,
                report,
                stdout,
                text,
                format,
                pretty,
                compact,
                sort,
                strict,
                quiet,
            } => cmd_history_decode(DecodeArgs {
                input,
                report,
                stdout,
                text,
                format,
                pretty,
                compact,
                sort,
                strict,
                quiet,
            }),
        },
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

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
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
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_history_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    let format = resolve_format(&resolved_input, args.format)?;
    let options = DecodeOptions {
        policy: if args.strict {
            MalformedPolicy::Abort
        } else {
            MalformedPolicy::Skip
        },
        sort_by_timestamp: args.sort,
    };
    tracing::debug!(input = %resolved_input.display(), ?format, ?options, "decoding history");

    if args.text {
        return print_summaries(&resolved_input, format, &options, args.quiet);
    }

    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if args.stdout {
        None
    } else {
        Some(args.report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report, --stdout or --text".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let rep = pumplog_core::analyze_history_file(&resolved_input, format, &options)
        .map_err(|err| decode_error(&err))?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    let Some(report) = report else {
        print!("{}", json);
        if !args.quiet {
            print_skipped(&rep);
        }
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !args.quiet {
        print_skipped(&rep);
        eprintln!(
            "OK: {} record(s) decoded -> {}",
            rep.records.len(),
            report.display()
        );
    }
    Ok(())
}

fn print_summaries(
    input: &Path,
    format: InputFormat,
    options: &DecodeOptions,
    quiet: bool,
) -> Result<(), CliError> {
    let data = pumplog_core::load_history(input, format)
        .map_err(|err| decode_error(&pumplog_core::AnalysisError::from(err)))?;
    let decoded = pumplog_core::decode_history(&data, options)
        .map_err(|err| decode_error(&pumplog_core::AnalysisError::from(err)))?;
    for entry in &decoded.records {
        println!("{}", entry.summary);
    }
    if !quiet && !decoded.skipped.is_empty() {
        eprintln!("Skipped records: {}", decoded.skipped.len());
    }
    Ok(())
}

fn decode_error(err: &pumplog_core::AnalysisError) -> CliError {
    let hint = match err {
        pumplog_core::AnalysisError::Source(pumplog_core::SourceError::InvalidHex { .. }) => {
            "check the dump or pass --format binary"
        }
        pumplog_core::AnalysisError::Source(_) => "check that the input file is readable",
        pumplog_core::AnalysisError::History(pumplog_core::HistoryError::Record { .. }) => {
            "drop --strict to skip malformed records"
        }
        pumplog_core::AnalysisError::History(_) => {
            "the dump must start on a record boundary and contain whole records"
        }
    };
    CliError::new(
        format!("history decoding failed: {err}"),
        Some(hint.to_string()),
    )
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    };
    // A directory that does not exist yet cannot hold the input.
    if parent.is_some_and(|dir| !dir.exists()) {
        return Ok(());
    }
    let report_abs = parent
        .map(fs::canonicalize)
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    if let Some(report_dir) = report_abs {
        let report_target = report_dir.join(
            report_path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
        );
        if report_target == input_abs {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn serialize_report(rep: &HistoryReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_skipped(rep: &HistoryReport) {
    if rep.skipped.is_empty() {
        return;
    }
    eprintln!("Skipped records:");
    for skipped in &rep.skipped {
        eprintln!(
            "  offset {} {} ({:#04x}): {}",
            skipped.offset, skipped.name, skipped.code, skipped.reason
        );
    }
}

fn resolve_format(input: &Path, format: FormatArg) -> Result<InputFormat, CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .bin, .hex or .txt history dump".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .bin, .hex or .txt history dump".to_string()),
        ));
    }
    match format {
        FormatArg::Binary => Ok(InputFormat::Binary),
        FormatArg::Hex => Ok(InputFormat::Hex),
        FormatArg::Auto => {
            let ext = input
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            if !matches!(ext.as_str(), "bin" | "hex" | "txt") {
                return Err(CliError::new(
                    format!("cannot infer input format for '{}'", input.display()),
                    Some("pass --format binary or --format hex".to_string()),
                ));
            }
            Ok(InputFormat::from_path(input))
        }
    }
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
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
            Some("pass a single history dump, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
