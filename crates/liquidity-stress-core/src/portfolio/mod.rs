pub mod assumptions;
pub mod profile;

pub use assumptions::{default_assumptions, AssumptionTable, ShockRule};
pub use profile::{default_liquidity_profile, Bucket, LiquidityTier, Profile};
