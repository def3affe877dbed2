#![forbid(unsafe_code)]

mod cmd;
mod dot;
mod output;
mod report;
mod settings;

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use linkgraph_core::{ErrorCode, FactError};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cmd::Status;
use cmd::analyze::AnalyzeArgs;
use cmd::cycles::CyclesArgs;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "linkgraph: dependency graphs of build targets and the libraries they link",
    long_about = None
)]
struct Cli {
    /// Output format: pretty, text or json (default: pretty on a terminal, text otherwise).
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Filter the graph, detect cycles and write DOT/JSON exports",
        long_about = "Load a fact file, apply filters, detect dependency cycles and write \
                      a global DOT graph, a cycle status file and optional per-library graphs.",
        after_help = "EXAMPLES:\n    # Global graph and cycle status next to ./deps\n    linkgraph analyze --facts facts.json --output deps\n\n    # Also write a JSON report\n    linkgraph analyze --facts facts.json --json-out deps.json\n\n    # One graph per library, hiding test libraries\n    linkgraph analyze --facts facts.json --split-by-library --exclude-lib '.*Tests?$'\n\n    # Fail CI when cycles are present\n    linkgraph analyze --facts facts.json --fail-on-cycles"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Report dependency cycles without writing any files",
        after_help = "EXAMPLES:\n    # KEY=VALUE status for scripts\n    linkgraph cycles --facts facts.json --format text\n\n    # Machine-readable output\n    linkgraph cycles --facts facts.json --format json"
    )]
    Cycles(CyclesArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LINKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "linkgraph=debug,linkgraph_core=debug,info"
        } else {
            "linkgraph=info,linkgraph_core=info,warn"
        })
    });

    let format = env::var("LINKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Attach a stable code to errors that carry one.
fn to_cli_error(err: &anyhow::Error) -> CliError {
    let cli_err = CliError::new(format!("{err:#}"));
    if let Some(fact_err) = err.downcast_ref::<FactError>() {
        cli_err.with_code(fact_err.code())
    } else if err.downcast_ref::<toml::de::Error>().is_some() {
        cli_err.with_code(ErrorCode::ConfigParseError)
    } else {
        cli_err
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let output = resolve_output_mode(cli.format);

    let result = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, output),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, output),
    };

    match result {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::CyclesFound) => ExitCode::from(2),
        Err(err) => {
            if render_error(output, &to_cli_error(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
