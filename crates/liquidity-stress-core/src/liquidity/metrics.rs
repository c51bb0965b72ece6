use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::liquidity::waterfall::WaterfallSummary;
use crate::types::{Days, Money, Rate};

/// Headline liquidity figures for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    pub cash_required: Money,
    pub cash_raised: Money,
    /// cash_raised / cash_required; 1.0 when nothing is required
    pub liquidity_coverage: Rate,
    /// shortfall / cash_required; 0.0 when nothing is required
    pub shortfall_pct: Rate,
    pub days_to_liquidity: Days,
    pub breach: bool,
}

/// Derive coverage and shortfall ratios from a waterfall summary.
pub fn liquidity_metrics(summary: &WaterfallSummary) -> LiquidityMetrics {
    let (liquidity_coverage, shortfall_pct) = if summary.cash_required > Decimal::ZERO {
        (
            summary.cash_raised / summary.cash_required,
            summary.shortfall / summary.cash_required,
        )
    } else {
        (Decimal::ONE, Decimal::ZERO)
    };

    LiquidityMetrics {
        cash_required: summary.cash_required,
        cash_raised: summary.cash_raised,
        liquidity_coverage,
        shortfall_pct,
        days_to_liquidity: summary.days_to_liquidity,
        breach: summary.breach,
    }
}
