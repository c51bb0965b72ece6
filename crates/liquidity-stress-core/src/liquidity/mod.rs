pub mod metrics;
pub mod pipeline;
pub mod stress;
pub mod translation;
pub mod waterfall;

pub use metrics::{liquidity_metrics, LiquidityMetrics};
pub use pipeline::{run_liquidity_stress, LiquidityStressInput, LiquidityStressOutput};
pub use stress::{apply_stress, StressedBucket};
pub use translation::{translate_scenario, DemandContribution, Scenario, TranslatedScenario};
pub use waterfall::{run_waterfall, WaterfallOutput, WaterfallRow, WaterfallSummary};
