use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::profile::{Bucket, Profile};
use crate::types::{Money, Rate};
use crate::LiquidityStressResult;

/// A bucket after markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressedBucket {
    #[serde(flatten)]
    pub bucket: Bucket,
    /// `min(stress_loss_pct, 1)`
    pub effective_loss: Rate,
    /// `market_value * (1 - effective_loss)`, always within [0, market_value]
    pub stressed_value: Money,
}

impl StressedBucket {
    /// True when the accumulated loss exceeded 100% and had to be clamped.
    pub fn loss_clamped(&self) -> bool {
        self.bucket.stress_loss_pct > Decimal::ONE
    }
}

/// Apply each bucket's stress loss to its market value.
///
/// Only here is the loss bounded: `stress_loss_pct` can grow past 1 during
/// translation, and is clamped to a full write-off at this step. The profile
/// is validated first, so a negative loss never inflates a stressed value.
pub fn apply_stress(profile: &Profile) -> LiquidityStressResult<Vec<StressedBucket>> {
    profile.validate()?;

    Ok(profile
        .buckets()
        .iter()
        .map(|bucket| {
            let effective_loss = bucket.stress_loss_pct.min(Decimal::ONE);
            StressedBucket {
                bucket: bucket.clone(),
                effective_loss,
                stressed_value: bucket.market_value * (Decimal::ONE - effective_loss),
            }
        })
        .collect())
}
