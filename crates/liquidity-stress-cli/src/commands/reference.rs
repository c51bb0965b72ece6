use clap::Args;
use serde_json::Value;

use liquidity_stress_core::portfolio::{
    default_assumptions, default_liquidity_profile, AssumptionTable, Profile,
};

use crate::input;

/// Arguments for printing a liquidity profile
#[derive(Args)]
pub struct ProfileArgs {
    /// Validate and print this profile file (JSON or YAML) instead of the reference one
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for printing an assumption table
#[derive(Args)]
pub struct AssumptionsArgs {
    /// Validate and print this table file (JSON or YAML) instead of the reference one
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_profile(args: ProfileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile: Profile = match args.input {
        Some(ref path) => input::file::read_config(path)?,
        None => default_liquidity_profile(),
    };
    profile.validate()?;

    let buckets: Vec<Value> = profile
        .iter()
        .map(|b| {
            serde_json::json!({
                "name": b.name,
                "market_value": b.market_value,
                "days_to_cash": b.days_to_cash,
                "tier": b.tier(),
                "stress_loss_pct": b.stress_loss_pct,
                "available": b.available,
            })
        })
        .collect();

    let total_fund_value = profile.total_fund_value()?;
    Ok(serde_json::json!({
        "total_fund_value": total_fund_value,
        "buckets": buckets,
    }))
}

pub fn run_assumptions(args: AssumptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table: AssumptionTable = match args.input {
        Some(ref path) => input::file::read_config(path)?,
        None => default_assumptions(),
    };
    table.validate()?;
    Ok(serde_json::to_value(table)?)
}
