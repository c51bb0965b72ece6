use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use liquidity_stress_core::liquidity::{run_liquidity_stress, LiquidityStressInput, Scenario};
use liquidity_stress_core::portfolio::{AssumptionTable, Profile};

use crate::input;

/// Arguments for a full pipeline run
#[derive(Args)]
pub struct RunArgs {
    /// Path to JSON input file (profile, assumptions, scenario, frozen_buckets)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the four-factor market stress
#[derive(Args)]
pub struct StressArgs {
    /// Equity drawdown as a positive fraction (e.g. 0.30 for a 30% fall)
    #[arg(long, default_value = "0")]
    pub equity_drawdown: Decimal,

    /// Credit shock as a positive fraction
    #[arg(long, default_value = "0")]
    pub credit_shock: Decimal,

    /// FX shock as a positive fraction
    #[arg(long, default_value = "0")]
    pub fx_shock: Decimal,

    /// Fund redemption rate (e.g. 0.10 for 10% of fund value)
    #[arg(long, default_value = "0")]
    pub redemption: Decimal,

    /// Bucket to freeze; repeat for several
    #[arg(long = "freeze")]
    pub freeze: Vec<String>,

    /// Profile file (JSON or YAML) replacing the reference profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Assumption table file (JSON or YAML) replacing the reference table
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_pipeline(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let stress_input: LiquidityStressInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        return Err("--input <file.json> or stdin required for a pipeline run".into());
    };
    let result = run_liquidity_stress(&stress_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_market_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = Scenario::market_stress(
        args.equity_drawdown,
        args.credit_shock,
        args.fx_shock,
        args.redemption,
    )?;

    let mut stress_input = LiquidityStressInput::new(scenario).with_frozen(args.freeze);
    if let Some(ref path) = args.profile {
        let profile: Profile = input::file::read_config(path)?;
        stress_input = stress_input.with_profile(profile);
    }
    if let Some(ref path) = args.assumptions {
        let assumptions: AssumptionTable = input::file::read_config(path)?;
        stress_input = stress_input.with_assumptions(assumptions);
    }

    let result = run_liquidity_stress(&stress_input)?;
    Ok(serde_json::to_value(result)?)
}
