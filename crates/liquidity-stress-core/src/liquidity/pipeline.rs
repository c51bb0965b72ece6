use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::liquidity::metrics::{liquidity_metrics, LiquidityMetrics};
use crate::liquidity::stress::{apply_stress, StressedBucket};
use crate::liquidity::translation::{translate_scenario, DemandContribution, Scenario};
use crate::liquidity::waterfall::{run_waterfall, WaterfallRow, WaterfallSummary};
use crate::portfolio::assumptions::{default_assumptions, AssumptionTable};
use crate::portfolio::profile::{default_liquidity_profile, Profile};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LiquidityStressResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything one scenario evaluation needs. Omitted reference data falls
/// back to the built-in profile and assumption table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityStressInput {
    #[serde(default = "default_liquidity_profile")]
    pub profile: Profile,
    #[serde(default = "default_assumptions")]
    pub assumptions: AssumptionTable,
    #[serde(default)]
    pub scenario: Scenario,
    /// Buckets to mark unavailable before translation
    #[serde(default)]
    pub frozen_buckets: Vec<String>,
}

impl LiquidityStressInput {
    /// Scenario against the built-in profile and assumptions.
    pub fn new(scenario: Scenario) -> Self {
        Self {
            profile: default_liquidity_profile(),
            assumptions: default_assumptions(),
            scenario,
            frozen_buckets: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_assumptions(mut self, assumptions: AssumptionTable) -> Self {
        self.assumptions = assumptions;
        self
    }

    pub fn with_frozen(mut self, buckets: Vec<String>) -> Self {
        self.frozen_buckets = buckets;
        self
    }
}

/// Full report for one scenario, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityStressOutput {
    pub total_fund_value: Money,
    pub cash_demand: Money,
    pub demand_breakdown: Vec<DemandContribution>,
    pub stressed_profile: Vec<StressedBucket>,
    pub waterfall: Vec<WaterfallRow>,
    pub summary: WaterfallSummary,
    pub metrics: LiquidityMetrics,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run freeze overrides, translation, stress, waterfall and metrics in order.
///
/// Any configuration or validation error aborts the run; no partial
/// waterfall is ever returned.
pub fn run_liquidity_stress(
    input: &LiquidityStressInput,
) -> LiquidityStressResult<ComputationOutput<LiquidityStressOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.profile.validate()?;
    let profile = input.profile.with_frozen(&input.frozen_buckets)?;
    for name in &input.frozen_buckets {
        warnings.push(format!("Bucket '{name}' frozen by override"));
    }

    if input.assumptions.is_empty() && !input.scenario.is_empty() {
        warn!("assumption table is empty; every shock will be ignored");
    }

    let translated = translate_scenario(&profile, &input.scenario, &input.assumptions)?;
    debug!(
        shocks = input.scenario.len(),
        cash_demand = %translated.cash_demand,
        "scenario translated"
    );
    for shock in &translated.ignored_shocks {
        warn!(shock = %shock, "no assumption rule for shock; ignored");
        warnings.push(format!("Shock '{shock}' has no assumption rule; ignored"));
    }

    let stressed_profile = apply_stress(&translated.profile)?;
    for stressed in stressed_profile.iter().filter(|s| s.loss_clamped()) {
        warnings.push(format!(
            "Accumulated stress loss for '{}' is {}; clamped to a full write-off",
            stressed.bucket.name, stressed.bucket.stress_loss_pct
        ));
    }

    let waterfall = run_waterfall(&stressed_profile, translated.cash_demand)?;
    let metrics = liquidity_metrics(&waterfall.summary);
    debug!(
        cash_raised = %metrics.cash_raised,
        days_to_liquidity = metrics.days_to_liquidity,
        "waterfall complete"
    );
    if metrics.breach {
        warn!(shortfall = %waterfall.summary.shortfall, "liquidity breach");
        warnings.push(format!(
            "Breach: shortfall of {} after liquidating all available buckets",
            waterfall.summary.shortfall
        ));
    }

    let output = LiquidityStressOutput {
        total_fund_value: profile.total_fund_value()?,
        cash_demand: translated.cash_demand,
        demand_breakdown: translated.demand_breakdown,
        stressed_profile,
        waterfall: waterfall.rows,
        summary: waterfall.summary,
        metrics,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "num_buckets": profile.len(),
        "num_shock_rules": input.assumptions.len(),
        "scenario": serde_json::to_value(&input.scenario)?,
        "frozen_buckets": input.frozen_buckets,
        "liquidation_order": "ascending days_to_cash, ties in profile order",
        "loss_clamp": "effective_loss = min(stress_loss_pct, 1)",
    });

    Ok(with_metadata(
        "Liquidity Stress Waterfall",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiquidityStressError;
    use crate::portfolio::assumptions::REDEMPTION;
    use crate::portfolio::profile::{Bucket, INFRASTRUCTURE, PUBLIC_EQUITIES, REAL_ESTATE};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn small_input(scenario: Scenario) -> LiquidityStressInput {
        LiquidityStressInput::new(scenario)
            .with_profile(
                Profile::new(vec![
                    Bucket::new("A", dec!(100), 0, dec!(0.0), true),
                    Bucket::new("B", dec!(100), 30, dec!(0.2), true),
                ])
                .unwrap(),
            )
            .with_assumptions(AssumptionTable::new())
    }

    #[test]
    fn test_empty_scenario_passes() {
        let result = run_liquidity_stress(&LiquidityStressInput::new(Scenario::new())).unwrap();
        let out = &result.result;

        assert_eq!(out.cash_demand, Decimal::ZERO);
        assert!(!out.metrics.breach);
        assert_eq!(out.metrics.liquidity_coverage, Decimal::ONE);
        assert_eq!(out.waterfall.len(), 6);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_redemption_ten_percent_default_profile() {
        let scenario = Scenario::new().with_shock(REDEMPTION, dec!(0.10));
        let result = run_liquidity_stress(&LiquidityStressInput::new(scenario)).unwrap();
        let out = &result.result;

        // 14bn needed: 9bn cash, then 5bn of 29.75bn stressed equities
        assert_eq!(out.cash_demand, Decimal::from(14_000_000_000i64));
        assert_eq!(out.waterfall[0].cash_used, Decimal::from(9_000_000_000i64));
        assert_eq!(out.waterfall[1].name, PUBLIC_EQUITIES);
        assert_eq!(out.waterfall[1].cash_used, Decimal::from(5_000_000_000i64));
        assert_eq!(out.metrics.days_to_liquidity, 1);
        assert!(!out.metrics.breach);
    }

    #[test]
    fn test_severe_market_stress_breaches() {
        let scenario =
            Scenario::market_stress(dec!(0.5), dec!(0.4), dec!(0.2), dec!(0.6)).unwrap();
        let result = run_liquidity_stress(&LiquidityStressInput::new(scenario)).unwrap();
        let out = &result.result;

        assert!(out.metrics.breach);
        assert!(out.metrics.liquidity_coverage < Decimal::ONE);
        assert_eq!(out.metrics.days_to_liquidity, 30);
        assert!(result.warnings.iter().any(|w| w.starts_with("Breach")));
        // Locked buckets are never touched
        let infra = out.waterfall.iter().find(|r| r.name == INFRASTRUCTURE).unwrap();
        assert_eq!(infra.cash_used, Decimal::ZERO);
    }

    #[test]
    fn test_freeze_override_applied() {
        // 63bn needed; 57.15bn reachable without real estate
        let scenario = Scenario::new().with_shock(REDEMPTION, dec!(0.45));
        let input =
            LiquidityStressInput::new(scenario).with_frozen(vec![REAL_ESTATE.to_string()]);
        let result = run_liquidity_stress(&input).unwrap();
        let out = &result.result;

        let re = out.waterfall.iter().find(|r| r.name == REAL_ESTATE).unwrap();
        assert_eq!(re.cash_used, Decimal::ZERO);
        assert!(out.metrics.breach);
        assert_eq!(out.summary.shortfall, Decimal::from(5_850_000_000i64));
        assert!(result.warnings.iter().any(|w| w.contains("frozen")));
    }

    #[test]
    fn test_unknown_freeze_target_fails() {
        let input = LiquidityStressInput::new(Scenario::new()).with_frozen(vec!["Gold".into()]);
        let err = run_liquidity_stress(&input).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_misbound_assumptions_fail_fast() {
        let input = small_input(Scenario::new()).with_assumptions(default_assumptions());
        let err = run_liquidity_stress(&input).unwrap_err();
        assert!(matches!(err, LiquidityStressError::UnknownBucket { .. }));
    }

    #[test]
    fn test_ignored_shock_warned() {
        let input = small_input(Scenario::new().with_shock("meteor", dec!(-1)));
        let result = run_liquidity_stress(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("meteor")));
        assert_eq!(result.result.cash_demand, Decimal::ZERO);
    }

    #[test]
    fn test_clamped_loss_warned() {
        let input = small_input(Scenario::new().with_shock("crash", dec!(-0.9)))
            .with_assumptions(AssumptionTable::new().with_rule(
                "crash",
                crate::portfolio::ShockRule::asset_impact("B", dec!(1.0), dec!(0)),
            ));
        let result = run_liquidity_stress(&input).unwrap();
        let b = result
            .result
            .stressed_profile
            .iter()
            .find(|s| s.bucket.name == "B")
            .unwrap();
        assert_eq!(b.stressed_value, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("clamped")));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let scenario =
            Scenario::market_stress(dec!(0.25), dec!(0.1), dec!(0.05), dec!(0.15)).unwrap();
        let input = LiquidityStressInput::new(scenario);
        let first = run_liquidity_stress(&input).unwrap();
        let second = run_liquidity_stress(&input).unwrap();
        assert_eq!(first.result, second.result);
        assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn test_input_deserialises_with_defaults() {
        let input: LiquidityStressInput = serde_json::from_value(serde_json::json!({
            "scenario": { "redemption": 0.05 },
            "frozen_buckets": ["Cash & Short-Term Bonds"]
        }))
        .unwrap();
        assert_eq!(input.profile, default_liquidity_profile());
        assert_eq!(input.assumptions, default_assumptions());
        assert_eq!(input.scenario.get(REDEMPTION), Some(dec!(0.05)));
    }

    #[test]
    fn test_oversized_redemption_returns_error() {
        let input: LiquidityStressInput = serde_json::from_value(serde_json::json!({
            "scenario": { "redemption": "1000000000000000000000" }
        }))
        .unwrap();
        let err = run_liquidity_stress(&input).unwrap_err();
        assert!(matches!(err, LiquidityStressError::InvalidInput { .. }));
    }

    #[test]
    fn test_fund_value_past_decimal_range_returns_error() {
        let input: LiquidityStressInput = serde_json::from_value(serde_json::json!({
            "profile": [
                { "name": "A", "market_value": "50000000000000000000000000000",
                  "days_to_cash": 0, "stress_loss_pct": "0" },
                { "name": "B", "market_value": "50000000000000000000000000000",
                  "days_to_cash": 5, "stress_loss_pct": "0" }
            ],
            "assumptions": {}
        }))
        .unwrap();
        let err = run_liquidity_stress(&input).unwrap_err();
        assert!(matches!(err, LiquidityStressError::InvalidInput { .. }));
    }

    #[test]
    fn test_metadata_populated() {
        let result = run_liquidity_stress(&LiquidityStressInput::new(Scenario::new())).unwrap();
        assert_eq!(result.methodology, "Liquidity Stress Waterfall");
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    }
}
