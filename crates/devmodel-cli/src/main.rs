mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::deal::DealArgs;
use commands::sensitivity::SensitivityArgs;

/// Real-estate development deal model
#[derive(Parser)]
#[command(
    name = "devmodel",
    version,
    about = "Real-estate development deal model",
    long_about = "Computes the profit waterfall of a single development deal with decimal \
                  precision: contingency, senior loan sizing and carry, investor capital and \
                  return, sale proceeds, developer profit and market positioning."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full deal model
    Deal(DealArgs),
    /// Profit waterfall from gross sales down to developer profit
    Waterfall(DealArgs),
    /// Cost-structure breakdown (profit floored at zero)
    Breakdown(DealArgs),
    /// Subject price against the three comparables
    Market(DealArgs),
    /// Two-way what-if grid over any two parameters
    Sensitivity(SensitivityArgs),
    /// Print the default parameter set
    Defaults,
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

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Deal(args) => commands::deal::run_deal(args),
        Commands::Waterfall(args) => commands::deal::run_waterfall(args),
        Commands::Breakdown(args) => commands::deal::run_breakdown(args),
        Commands::Market(args) => commands::deal::run_market(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Defaults => commands::deal::run_defaults(),
        Commands::Version => {
            println!("devmodel {}", env!("CARGO_PKG_VERSION"));
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
