//! # Costwise CLI
//!
//! Runs a single cost calculation from a JSON request and prints the JSON
//! result. Intended for scripting and as a backend for form handlers.
//!
//! ```text
//! calc_cli run --input quote.json
//! echo '{"type":"PriceForMargin","base_cost":100,"target_margin_percent":20}' | calc_cli run
//! calc_cli defaults > settings.json
//! ```
//!
//! Logs go to stderr (`RUST_LOG=calc_core=debug` for rule-level detail);
//! stdout carries only JSON. Errors print a JSON error object and exit 1.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use calc_core::{CalcError, CalcResult, CalculationRequest, CalculatorSettings};

#[derive(Parser)]
#[command(name = "calc_cli")]
#[command(about = "Costwise CLI - manufacturing cost calculations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON); unspecified values keep their defaults
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a calculation request
    Run {
        /// Request file (JSON); reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the built-in default settings (ignores --settings)
    Defaults,
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error_code: &'a str,
    error: String,
    details: &'a CalcError,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(code = err.error_code(), "{err}");
            let output = ErrorOutput {
                error_code: err.error_code(),
                error: err.to_string(),
                details: &err,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{json}"),
                Err(_) => println!(r#"{{"error_code": "{}"}}"#, err.error_code()),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: &Cli) -> CalcResult<String> {
    match &cli.command {
        Commands::Run { input } => {
            let settings = load_settings(cli.settings.as_deref())?;
            let raw = read_request(input.as_deref())?;
            let request: CalculationRequest = serde_json::from_str(&raw)?;
            tracing::info!(calc_type = request.calc_type(), "running calculation");
            let output = request.run(&settings)?;
            to_json(&output, cli.compact)
        }
        Commands::Defaults => to_json(&CalculatorSettings::default(), cli.compact),
    }
}

fn load_settings(path: Option<&Path>) -> CalcResult<CalculatorSettings> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| CalcError::Internal {
                message: format!("cannot read settings '{}': {e}", path.display()),
            })?;
            CalculatorSettings::from_json(&raw)
        }
        None => Ok(CalculatorSettings::default()),
    }
}

fn read_request(path: Option<&Path>) -> CalcResult<String> {
    let result = match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    result.map_err(|e| CalcError::Internal {
        message: format!("cannot read request: {e}"),
    })
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> CalcResult<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}
