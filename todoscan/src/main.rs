//! # todoscan
//!
//! A CLI tool that finds TODO-style marker comments in a repository and
//! writes a Markdown report with per-project tallies and history charts.
//!
//! ## Overview
//!
//! todoscan is built on top of todoscanlib. A run scans the source tree,
//! groups markers by the project manifest (`*.csproj` by default) above
//! them, writes `TO-DO.md`, appends the counts to a JSON history and writes
//! chart specifications from that history.
//!
//! ## Usage
//!
//! ```bash
//! # Scan the current directory, writing to ./output
//! todoscan
//!
//! # Scan a checkout, writing elsewhere
//! todoscan scan ./repo -o ./site
//!
//! # Only some files
//! todoscan . --include "src/**" --exclude "**/generated/**"
//!
//! # Print the aggregation as JSON
//! todoscan . --output json
//!
//! # Print chart specifications from an existing history
//! todoscan plot -o ./site
//! ```
//!
//! In CI, `INPUT_SOURCE_SCAN_DIR`, `INPUT_OUTPUT_DIR`, `GITHUB_REPOSITORY`,
//! `GITHUB_SHA` and `GITHUB_REF_NAME` fill in the matching flags.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use todoscanlib::options::DEFAULT_OUTPUT_DIR;
use todoscanlib::{generate_report, load_plots, FilterConfig, ReportConfig};
use tracing_subscriber::EnvFilter;

/// Arguments shared by the root command and `scan`
fn scan_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("path")
            .help("Directory to scan (defaults to current directory)")
            .env("INPUT_SOURCE_SCAN_DIR")
            .default_value("."),
    )
    .arg(output_dir_arg())
    .arg(
        Arg::new("include")
            .short('i')
            .long("include")
            .action(ArgAction::Append)
            .help("Include files matching glob pattern"),
    )
    .arg(
        Arg::new("exclude")
            .short('e')
            .long("exclude")
            .action(ArgAction::Append)
            .help("Exclude files matching glob pattern"),
    )
    .arg(
        Arg::new("project-manifest")
            .long("project-manifest")
            .action(ArgAction::Append)
            .help("File-name glob identifying project manifests (default: *.csproj)"),
    )
    .arg(
        Arg::new("repository")
            .long("repository")
            .env("GITHUB_REPOSITORY")
            .help("GitHub owner/name used for source links"),
    )
    .arg(
        Arg::new("commit")
            .long("commit")
            .env("GITHUB_SHA")
            .help("Commit used for source links"),
    )
    .arg(
        Arg::new("branch")
            .long("branch")
            .env("GITHUB_REF_NAME")
            .help("Branch used for source links"),
    )
    .arg(
        Arg::new("link-to-commit")
            .long("link-to-commit")
            .action(ArgAction::SetTrue)
            .help("Link sources to the commit instead of the branch"),
    )
    .arg(
        Arg::new("no-history")
            .long("no-history")
            .action(ArgAction::SetTrue)
            .help("Do not append this scan to the history"),
    )
    .arg(
        Arg::new("sequential")
            .long("sequential")
            .action(ArgAction::SetTrue)
            .help("Scan files one at a time"),
    )
}

fn output_dir_arg() -> Arg {
    Arg::new("output-dir")
        .short('o')
        .long("output-dir")
        .env("INPUT_OUTPUT_DIR")
        .help("Directory for the report, history and charts (default: <path>/output)")
}

/// Build the clap Command structure
fn build_command() -> Command {
    let root = Command::new("todoscan")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Find TODO/NOTE/BUG markers and write a Markdown report with history")
        .arg(
            Arg::new("output")
                .long("output")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        );

    scan_args(root)
        .subcommand(scan_args(
            Command::new("scan").about("Scan, write the report and record history (default command)"),
        ))
        .subcommand(
            Command::new("plot")
                .about("Print chart specifications from the recorded history")
                .arg(output_dir_arg()),
        )
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let filter = FilterConfig::new()
        .include_many(&strings(matches, "include"))?
        .exclude_many(&strings(matches, "exclude"))?;
    Ok(filter)
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<ReportConfig> {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or(".");

    let mut config = ReportConfig::new(path)
        .filter(build_filter(matches)?)
        .manifest_patterns(strings(matches, "project-manifest"))
        .repository(matches.get_one::<String>("repository").cloned())
        .commit(matches.get_one::<String>("commit").cloned())
        .branch(matches.get_one::<String>("branch").cloned())
        .link_to_branch(!matches.get_flag("link-to-commit"))
        .record_history(!matches.get_flag("no-history"))
        .parallel(!matches.get_flag("sequential"));
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config = config.output_dir(dir);
    }
    Ok(config)
}

fn json_output(matches: &ArgMatches) -> bool {
    matches.get_one::<String>("output").map(String::as_str) == Some("json")
}

/// Handler for the scan command
fn scan_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let config = build_config(matches)?;
    let outcome = generate_report(&config)
        .with_context(|| format!("failed to scan '{}'", config.source_dir.display()))?;

    if json_output(matches) {
        return Ok(serde_json::to_string_pretty(&outcome.aggregation)? + "\n");
    }
    Ok(render::render_summary(&outcome, console::colors_enabled()))
}

/// Handler for the plot command
fn plot_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let output_dir = matches
        .get_one::<String>("output-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let config = ReportConfig::default().output_dir(output_dir);
    let plots = load_plots(&config)
        .with_context(|| format!("failed to read history '{}'", config.history_path().display()))?;
    Ok(serde_json::to_string_pretty(&plots)? + "\n")
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let (handler, leaf): (fn(&ArgMatches) -> anyhow::Result<String>, &ArgMatches) =
        match matches.subcommand() {
            Some(("plot", sub)) => (plot_handler, sub),
            Some(("scan", sub)) => (scan_handler, sub),
            _ => (scan_handler, &matches),
        };
    init_logging(leaf.get_count("verbose"));

    match handler(leaf) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
