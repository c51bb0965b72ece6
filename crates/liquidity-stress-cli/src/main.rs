mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::reference::{AssumptionsArgs, ProfileArgs};
use commands::stress::{RunArgs, StressArgs};

/// Liquidity stress testing against a time-to-cash liquidation waterfall
#[derive(Parser)]
#[command(
    name = "lse",
    version,
    about = "Liquidity stress testing against a time-to-cash liquidation waterfall",
    long_about = "Translates market shocks (equity drawdown, credit shock, FX shock, \
                  redemptions) into bucket markdowns and cash demands, then liquidates \
                  the portfolio earliest-cash-first to test whether the demand can be met."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline from a full JSON input (file or stdin)
    Run(RunArgs),
    /// Run the four-factor market stress from flags
    Stress(StressArgs),
    /// Print the reference liquidity profile
    Profile(ProfileArgs),
    /// Print the reference shock assumptions
    Assumptions(AssumptionsArgs),
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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(output = ?cli.output, "starting lse");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::stress::run_pipeline(args),
        Commands::Stress(args) => commands::stress::run_market_stress(args),
        Commands::Profile(args) => commands::reference::run_profile(args),
        Commands::Assumptions(args) => commands::reference::run_assumptions(args),
        Commands::Version => {
            println!("lse {}", env!("CARGO_PKG_VERSION"));
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
