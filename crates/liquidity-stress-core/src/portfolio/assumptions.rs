use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LiquidityStressError;
use crate::portfolio::profile::{
    Profile, CASH_AND_SHORT_TERM_BONDS, PUBLIC_CREDIT, PUBLIC_EQUITIES,
};
use crate::types::{deserialize_unique_keys, Rate};
use crate::LiquidityStressResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How one named shock moves the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShockRule {
    /// Marks down a single bucket and may trigger margin or collateral calls
    /// proportional to that bucket's size.
    AssetImpact {
        bucket: String,
        /// Share of the shock that reaches the bucket's value, in [0, 1]
        #[serde(default = "default_pass_through")]
        pass_through: Rate,
        /// Cash demanded per unit of shock per unit of bucket value
        #[serde(default)]
        liquidity_demand_pct: Rate,
    },
    /// External outflow sized against the whole fund (e.g. redemptions).
    DirectLiability,
}

fn default_pass_through() -> Rate {
    Decimal::ONE
}

impl ShockRule {
    pub fn asset_impact(bucket: impl Into<String>, pass_through: Rate, liquidity_demand_pct: Rate) -> Self {
        Self::AssetImpact {
            bucket: bucket.into(),
            pass_through,
            liquidity_demand_pct,
        }
    }

    /// Bucket the rule targets, if any.
    pub fn target_bucket(&self) -> Option<&str> {
        match self {
            Self::AssetImpact { bucket, .. } => Some(bucket.as_str()),
            Self::DirectLiability => None,
        }
    }
}

/// Shock-name to rule mapping. Immutable once built; passed explicitly into
/// the translator so alternative tables can be substituted freely. A shock
/// named twice in a table file is rejected on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssumptionTable {
    #[serde(deserialize_with = "deserialize_unique_keys")]
    rules: BTreeMap<String, ShockRule>,
}

impl AssumptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, shock: impl Into<String>, rule: ShockRule) -> Self {
        self.rules.insert(shock.into(), rule);
        self
    }

    pub fn get(&self, shock: &str) -> Option<&ShockRule> {
        self.rules.get(shock)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShockRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check rule parameters are within range.
    pub fn validate(&self) -> LiquidityStressResult<()> {
        for (shock, rule) in self.iter() {
            if let ShockRule::AssetImpact {
                pass_through,
                liquidity_demand_pct,
                ..
            } = rule
            {
                if *pass_through < Decimal::ZERO || *pass_through > Decimal::ONE {
                    return Err(LiquidityStressError::InvalidInput {
                        field: format!("assumptions.{shock}.pass_through"),
                        reason: format!("Pass-through must be between 0 and 1 (got {pass_through})"),
                    });
                }
                if *liquidity_demand_pct < Decimal::ZERO {
                    return Err(LiquidityStressError::InvalidInput {
                        field: format!("assumptions.{shock}.liquidity_demand_pct"),
                        reason: format!(
                            "Liquidity demand must be non-negative (got {liquidity_demand_pct})"
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Bind the table to a profile: every targeted bucket must exist.
    ///
    /// Runs over the whole table, not just the shocks a scenario uses, so a
    /// broken table fails on the first evaluation rather than the first
    /// scenario that happens to exercise the bad rule.
    pub fn bind(&self, profile: &Profile) -> LiquidityStressResult<()> {
        self.validate()?;
        for (shock, rule) in self.iter() {
            if let Some(bucket) = rule.target_bucket() {
                if !profile.contains(bucket) {
                    return Err(LiquidityStressError::UnknownBucket {
                        context: format!("shock rule '{shock}'"),
                        bucket: bucket.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reference assumptions
// ---------------------------------------------------------------------------

pub const EQUITY_DRAWDOWN: &str = "equity_drawdown";
pub const CREDIT_SHOCK: &str = "credit_shock";
pub const FX_SHOCK: &str = "fx_shock";
pub const REDEMPTION: &str = "redemption";

/// Illustrative shock rules matching [`default_liquidity_profile`].
///
/// [`default_liquidity_profile`]: crate::portfolio::profile::default_liquidity_profile
pub fn default_assumptions() -> AssumptionTable {
    AssumptionTable::new()
        .with_rule(
            EQUITY_DRAWDOWN,
            ShockRule::asset_impact(PUBLIC_EQUITIES, dec!(1.0), dec!(0.10)),
        )
        .with_rule(
            CREDIT_SHOCK,
            ShockRule::asset_impact(PUBLIC_CREDIT, dec!(0.8), dec!(0.05)),
        )
        .with_rule(
            FX_SHOCK,
            ShockRule::asset_impact(CASH_AND_SHORT_TERM_BONDS, dec!(0.5), dec!(0.00)),
        )
        .with_rule(REDEMPTION, ShockRule::DirectLiability)
}
