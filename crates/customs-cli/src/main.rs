mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::calculate::CalculateArgs;
use commands::regime::RegimeArgs;
use commands::search::SearchArgs;

/// Import customs payment calculations
#[derive(Parser)]
#[command(
    name = "customs",
    version,
    about = "Import customs payment calculations",
    long_about = "A CLI for estimating import customs payments with decimal precision. \
                  Resolves the tariff for a classification code, selects the duty regime \
                  from the origin, and computes the processing fee, import duty, excise, \
                  VAT and vehicle utilization fee against a reference-data snapshot."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Calculator configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate every payment due on a consignment
    Calculate(CalculateArgs),
    /// Simplified calculation returning only the headline amounts
    Summary(CalculateArgs),
    /// Search classification codes by prefix or description
    Search(SearchArgs),
    /// Show the duty regime that applies to an origin
    Regime(RegimeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config_path = cli.config.as_deref();
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args, config_path),
        Commands::Summary(args) => commands::calculate::run_summary(args, config_path),
        Commands::Search(args) => commands::search::run_search(args),
        Commands::Regime(args) => commands::regime::run_regime(args, config_path),
        Commands::Version => {
            println!("customs {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
