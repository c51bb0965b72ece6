use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LiquidityStressError;
use crate::portfolio::assumptions::{
    AssumptionTable, ShockRule, CREDIT_SHOCK, EQUITY_DRAWDOWN, FX_SHOCK, REDEMPTION,
};
use crate::portfolio::profile::Profile;
use crate::types::{deserialize_unique_keys, Money};
use crate::LiquidityStressResult;

/// Largest magnitude accepted by [`Scenario::market_stress`].
const MAX_MARKET_SHOCK: Decimal = dec!(0.99);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Signed shock magnitudes keyed by shock name.
///
/// Drawdowns are usually negative, redemption rates positive; only the
/// absolute value feeds the translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scenario {
    #[serde(deserialize_with = "deserialize_unique_keys")]
    shocks: BTreeMap<String, Decimal>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shock(mut self, shock: impl Into<String>, magnitude: Decimal) -> Self {
        self.shocks.insert(shock.into(), magnitude);
        self
    }

    /// The four-factor market stress: equity, credit and FX magnitudes are
    /// entered as positive drawdowns and stored negated; redemption is kept
    /// as a positive outflow rate. Each input must lie in [0, 0.99].
    pub fn market_stress(
        equity_drawdown: Decimal,
        credit_shock: Decimal,
        fx_shock: Decimal,
        redemption: Decimal,
    ) -> LiquidityStressResult<Self> {
        for (field, value) in [
            (EQUITY_DRAWDOWN, equity_drawdown),
            (CREDIT_SHOCK, credit_shock),
            (FX_SHOCK, fx_shock),
            (REDEMPTION, redemption),
        ] {
            if value < Decimal::ZERO || value > MAX_MARKET_SHOCK {
                return Err(LiquidityStressError::InvalidInput {
                    field: field.into(),
                    reason: format!("Shock magnitude must be between 0 and 0.99 (got {value})"),
                });
            }
        }

        Ok(Self::new()
            .with_shock(EQUITY_DRAWDOWN, -equity_drawdown)
            .with_shock(CREDIT_SHOCK, -credit_shock)
            .with_shock(FX_SHOCK, -fx_shock)
            .with_shock(REDEMPTION, redemption))
    }

    pub fn get(&self, shock: &str) -> Option<Decimal> {
        self.shocks.get(shock).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.shocks.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.shocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shocks.is_empty()
    }
}

/// Cash demand attributable to a single shock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandContribution {
    pub shock: String,
    pub amount: Money,
}

/// Output of the scenario translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedScenario {
    /// Same buckets as the input; only `stress_loss_pct` may differ
    pub profile: Profile,
    /// Total cash the fund must raise
    pub cash_demand: Money,
    /// Per-shock contributions to `cash_demand`
    pub demand_breakdown: Vec<DemandContribution>,
    /// Scenario entries with no matching rule
    pub ignored_shocks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Translate abstract shocks into bucket markdowns and a cash demand.
///
/// Asset-impact rules add `|m| * pass_through` to the target bucket's stress
/// loss (uncapped, additive across shocks) and, when the rule carries a
/// liquidity demand, `liquidity_demand_pct * |m| * market_value`. Direct
/// liabilities add `|m| * total_fund_value`. Both demand terms use the
/// unstressed input profile. Unknown shocks are skipped.
pub fn translate_scenario(
    profile: &Profile,
    scenario: &Scenario,
    assumptions: &AssumptionTable,
) -> LiquidityStressResult<TranslatedScenario> {
    profile.validate()?;
    assumptions.bind(profile)?;

    let total_fund_value = profile.total_fund_value()?;
    let mut adjusted = profile.clone();
    let mut cash_demand = Decimal::ZERO;
    let mut demand_breakdown: Vec<DemandContribution> = Vec::new();
    let mut ignored_shocks: Vec<String> = Vec::new();

    for (shock, magnitude) in scenario.iter() {
        let Some(rule) = assumptions.get(shock) else {
            ignored_shocks.push(shock.to_string());
            continue;
        };
        let size = magnitude.abs();

        match rule {
            ShockRule::DirectLiability => {
                let amount = size
                    .checked_mul(total_fund_value)
                    .ok_or_else(|| out_of_range(shock))?;
                cash_demand = cash_demand
                    .checked_add(amount)
                    .ok_or_else(|| out_of_range(shock))?;
                demand_breakdown.push(DemandContribution {
                    shock: shock.to_string(),
                    amount,
                });
            }
            ShockRule::AssetImpact {
                bucket,
                pass_through,
                liquidity_demand_pct,
            } => {
                let unknown = || LiquidityStressError::UnknownBucket {
                    context: format!("shock rule '{shock}'"),
                    bucket: bucket.clone(),
                };
                let base_value = profile.get(bucket).ok_or_else(unknown)?.market_value;
                let target = adjusted.get_mut(bucket).ok_or_else(unknown)?;

                let current = target.stress_loss_pct;
                target.stress_loss_pct = size
                    .checked_mul(*pass_through)
                    .and_then(|markdown| current.checked_add(markdown))
                    .ok_or_else(|| out_of_range(shock))?;

                if *liquidity_demand_pct > Decimal::ZERO {
                    let amount = liquidity_demand_pct
                        .checked_mul(size)
                        .and_then(|rate| rate.checked_mul(base_value))
                        .ok_or_else(|| out_of_range(shock))?;
                    cash_demand = cash_demand
                        .checked_add(amount)
                        .ok_or_else(|| out_of_range(shock))?;
                    demand_breakdown.push(DemandContribution {
                        shock: shock.to_string(),
                        amount,
                    });
                }
            }
        }
    }

    Ok(TranslatedScenario {
        profile: adjusted,
        cash_demand,
        demand_breakdown,
        ignored_shocks,
    })
}

fn out_of_range(shock: &str) -> LiquidityStressError {
    LiquidityStressError::InvalidInput {
        field: format!("scenario.{shock}"),
        reason: "Shock magnitude pushes the result outside the representable range".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
