//! Command-line interface for TVTMS tables
//! Runs a table through the mapping engine and prints the resulting mappings.
//!
//! Usage:
//!   tvtms run `<path>` [--config `<file>`] [--strictness `<policy>`] [--tradition `<name>`]
//!             [--catalog `<file>`] [--format `<format>`] [--report `<format>`]
//!   tvtms parse `<reference>`...    - Parse and expand single references
//!   tvtms list-actions            - List action keywords in priority order
//!   tvtms list-samples            - List the curated sample tables
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `warn`).

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;
use versemap::tvtms::catalog::VerseCatalog;
use versemap::tvtms::config::Loader;
use versemap::tvtms::loader::MAX_RANGE_VERSES;
use versemap::tvtms::pipeline::{run_with, RunOptions};
use versemap::tvtms::processor::samples::TvtmsSources;
use versemap::tvtms::processor::{available_formats, format_mappings, format_report, OutputFormat};
use versemap::tvtms::{parse_reference, PriorityTable, RunStatus};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("run", run_matches)) => handle_run_command(run_matches),
        Some(("parse", parse_matches)) => {
            let references: Vec<&String> = parse_matches
                .get_many::<String>("reference")
                .map(|refs| refs.collect())
                .unwrap_or_default();
            handle_parse_command(&references)
        }
        Some(("list-actions", _)) => {
            handle_list_actions_command();
            Ok(())
        }
        Some(("list-samples", _)) => {
            handle_list_samples_command();
            Ok(())
        }
        _ => unreachable!(),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("tvtms")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build versification mappings from TVTMS tables")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run a table through the mapping engine")
                .arg(
                    Arg::new("path")
                        .help("Path to the TVTMS table")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML file layered over the built-in defaults"),
                )
                .arg(
                    Arg::new("strictness")
                        .long("strictness")
                        .short('s')
                        .help("Row policy: strict, tolerant or permissive"),
                )
                .arg(
                    Arg::new("tradition")
                        .long("tradition")
                        .short('t')
                        .help("Standard tradition the run converts to (e.g. 'English')"),
                )
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .help("Verse catalog (Book<TAB>Chapter<TAB>Count) for coverage"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Mapping output format (tsv, json, yaml, simple)")
                        .default_value("tsv"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .short('r')
                        .help("Also print the run report to stderr in this format")
                        .num_args(0..=1)
                        .default_missing_value("simple"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse references and show their expansion")
                .arg(
                    Arg::new("reference")
                        .help("Reference cells, e.g. 'Gen.32.1-3' or 'Mat.15.6(15.5)'")
                        .required(true)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("list-actions").about("List action keywords in priority order"))
        .subcommand(Command::new("list-samples").about("List the curated sample tables"))
}

/// Parse the optional `--report` value. A bare `--report` means `simple`.
fn report_format(matches: &clap::ArgMatches) -> Result<Option<OutputFormat>, String> {
    matches
        .get_one::<String>("report")
        .map(|name| name.parse::<OutputFormat>())
        .transpose()
        .map_err(|e| e.to_string())
}

/// Handle the run command
fn handle_run_command(matches: &clap::ArgMatches) -> Result<(), String> {
    let path = matches
        .get_one::<String>("path")
        .ok_or("missing table path")?;
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("tsv")
        .parse::<OutputFormat>()
        .map_err(|e| format!("{} (available: {})", e, available_formats().join(", ")))?;
    let report_as = report_format(matches)?;

    let mut loader = Loader::new();
    if let Some(config_path) = matches.get_one::<String>("config") {
        loader = loader.with_file(config_path);
    }
    if let Some(strictness) = matches.get_one::<String>("strictness") {
        loader = loader
            .set_override("strictness", strictness.to_ascii_lowercase())
            .map_err(|e| e.to_string())?;
    }
    if let Some(tradition) = matches.get_one::<String>("tradition") {
        loader = loader
            .set_override("standard_tradition", tradition.to_ascii_lowercase())
            .map_err(|e| e.to_string())?;
    }
    let config = loader.build().map_err(|e| e.to_string())?;

    let catalog = match matches.get_one::<String>("catalog") {
        Some(catalog_path) => {
            let text = std::fs::read_to_string(catalog_path)
                .map_err(|e| format!("Error reading catalog {}: {}", catalog_path, e))?;
            Some(VerseCatalog::parse(&text).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading file {}: {}", path, e))?;
    let output = run_with(&source, &config, RunOptions { catalog }).map_err(|e| e.to_string())?;

    let rendered = format_mappings(&output.mappings, format).map_err(|e| e.to_string())?;
    print!("{}", rendered);

    if let Some(report_as) = report_as {
        let report = format_report(&output.report, report_as).map_err(|e| e.to_string())?;
        eprint!("{}", report);
    }

    if output.report.overall_status == RunStatus::Failed {
        return Err(format!("run failed\n{}", output.report));
    }
    Ok(())
}

/// Handle the parse command
fn handle_parse_command(references: &[&String]) -> Result<(), String> {
    let mut failures = 0;
    for reference in references {
        match parse_reference(reference) {
            Ok(spec) if spec.expanded_len() > MAX_RANGE_VERSES => {
                println!(
                    "{}\terror: range covers {} verses, more than the {} allowed",
                    reference,
                    spec.expanded_len(),
                    MAX_RANGE_VERSES
                );
                failures += 1;
            }
            Ok(spec) => {
                let expanded: Vec<String> = spec.expand().iter().map(|s| s.to_string()).collect();
                println!("{}\t{}\t{}", reference, spec, expanded.join(" "));
            }
            Err(e) => {
                println!("{}\terror: {}", reference, e);
                failures += 1;
            }
        }
    }
    match failures {
        0 => Ok(()),
        n => Err(format!("{} of {} references failed to parse", n, references.len())),
    }
}

/// Handle the list-actions command
fn handle_list_actions_command() {
    println!("Actions in default priority order:\n");
    for kind in PriorityTable::default().order() {
        println!("  {}", kind);
        println!("    keywords: {}", kind.keywords().join(", "));
    }
}

/// Handle the list-samples command
fn handle_list_samples_command() {
    println!("Available sample tables:\n");
    for sample in TvtmsSources::list_samples() {
        match TvtmsSources::get_sample_info(sample) {
            Ok(info) => {
                println!("  {}", sample);
                if let Some(description) = info.description {
                    println!("    {}", description);
                }
            }
            Err(_) => println!("  {} (not readable from this directory)", sample),
        }
    }
}
