use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LiquidityStressError;
use crate::liquidity::stress::StressedBucket;
use crate::types::{Days, Money};
use crate::LiquidityStressResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ledger line for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallRow {
    pub name: String,
    pub stressed_value: Money,
    /// Cash raised from this bucket, never above `stressed_value`
    pub cash_used: Money,
    /// `stressed_value - cash_used`
    pub remaining_value: Money,
    pub days_to_cash: Days,
}

/// Aggregate result of the liquidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallSummary {
    pub cash_required: Money,
    pub cash_raised: Money,
    /// Unmet demand, floored at zero
    pub shortfall: Money,
    /// Slowest horizon actually drawn on
    pub days_to_liquidity: Days,
    pub breach: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallOutput {
    /// One row per bucket, ascending `days_to_cash`
    pub rows: Vec<WaterfallRow>,
    pub summary: WaterfallSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Raise `cash_required` by liquidating buckets earliest-cash-first.
///
/// Buckets are visited in ascending `days_to_cash`; equal horizons keep their
/// profile order. Each available bucket gives up `min(stressed_value, need)`
/// until the need is met. Frozen buckets still get a ledger row, with
/// nothing drawn.
pub fn run_waterfall(
    stressed_profile: &[StressedBucket],
    cash_required: Money,
) -> LiquidityStressResult<WaterfallOutput> {
    if cash_required < Decimal::ZERO {
        return Err(LiquidityStressError::InvalidInput {
            field: "cash_required".into(),
            reason: format!("Cash required must be non-negative (got {cash_required})"),
        });
    }

    // sort_by_key is stable: ties stay in profile order
    let mut ordered: Vec<&StressedBucket> = stressed_profile.iter().collect();
    ordered.sort_by_key(|b| b.bucket.days_to_cash);

    let mut rows: Vec<WaterfallRow> = Vec::with_capacity(ordered.len());
    let mut remaining_need = cash_required;
    let mut cash_raised = Decimal::ZERO;
    let mut days_to_liquidity: Days = 0;

    for stressed in ordered {
        let bucket = &stressed.bucket;

        let usable = if bucket.available && remaining_need > Decimal::ZERO {
            stressed.stressed_value.min(remaining_need)
        } else {
            Decimal::ZERO
        };

        if usable > Decimal::ZERO {
            days_to_liquidity = days_to_liquidity.max(bucket.days_to_cash);
            cash_raised += usable;
            remaining_need -= usable;
        }

        rows.push(WaterfallRow {
            name: bucket.name.clone(),
            stressed_value: stressed.stressed_value,
            cash_used: usable,
            remaining_value: stressed.stressed_value - usable,
            days_to_cash: bucket.days_to_cash,
        });
    }

    let summary = WaterfallSummary {
        cash_required,
        cash_raised,
        shortfall: remaining_need.max(Decimal::ZERO),
        days_to_liquidity,
        breach: remaining_need > Decimal::ZERO,
    };

    Ok(WaterfallOutput { rows, summary })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
