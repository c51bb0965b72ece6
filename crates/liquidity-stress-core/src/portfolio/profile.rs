use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::LiquidityStressError;
use crate::types::{Days, Money, Rate};
use crate::LiquidityStressResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One slice of the fund sharing a liquidation horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Unique label, used as the join key by shock rules and overrides
    pub name: String,
    /// Base-currency value before stress
    pub market_value: Money,
    /// Days needed to turn the bucket into usable cash
    pub days_to_cash: Days,
    /// Fraction of value lost on forced sale. Accumulates across shocks and
    /// is NOT bounded above; only the stress applier clamps it to 1.
    pub stress_loss_pct: Rate,
    /// Frozen buckets never contribute cash to the waterfall
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Bucket {
    pub fn new(
        name: impl Into<String>,
        market_value: Money,
        days_to_cash: Days,
        stress_loss_pct: Rate,
        available: bool,
    ) -> Self {
        Self {
            name: name.into(),
            market_value,
            days_to_cash,
            stress_loss_pct,
            available,
        }
    }

    pub fn tier(&self) -> LiquidityTier {
        LiquidityTier::for_days(self.days_to_cash)
    }
}

/// Coarse liquidity classification of a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityTier {
    /// Same day or T+1
    Immediate,
    /// Up to 30 days
    ShortTerm,
    /// Beyond 30 days
    LongDated,
}

impl LiquidityTier {
    pub fn for_days(days: Days) -> Self {
        match days {
            0..=1 => Self::Immediate,
            2..=30 => Self::ShortTerm,
            _ => Self::LongDated,
        }
    }
}

impl std::fmt::Display for LiquidityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate => write!(f, "Immediate"),
            Self::ShortTerm => write!(f, "Short-Term"),
            Self::LongDated => write!(f, "Long-Dated"),
        }
    }
}

/// The whole fund: buckets with unique names, kept in declaration order.
///
/// Declaration order matters: it breaks ties between buckets with the same
/// `days_to_cash` in the waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    buckets: Vec<Bucket>,
}

impl Profile {
    /// Build a profile, rejecting empty, duplicate or malformed buckets.
    pub fn new(buckets: Vec<Bucket>) -> LiquidityStressResult<Self> {
        let profile = Self { buckets };
        profile.validate()?;
        Ok(profile)
    }

    /// Check the invariants a deserialised profile cannot enforce by itself.
    pub fn validate(&self) -> LiquidityStressResult<()> {
        if self.buckets.is_empty() {
            return Err(LiquidityStressError::InsufficientData(
                "Profile must contain at least one bucket".into(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.buckets.len());
        for bucket in &self.buckets {
            if bucket.name.trim().is_empty() {
                return Err(LiquidityStressError::InvalidInput {
                    field: "profile.name".into(),
                    reason: "Bucket name must not be empty".into(),
                });
            }
            if !seen.insert(bucket.name.as_str()) {
                return Err(LiquidityStressError::DuplicateBucket(bucket.name.clone()));
            }
            if bucket.market_value < Decimal::ZERO {
                return Err(LiquidityStressError::InvalidInput {
                    field: format!("profile.{}.market_value", bucket.name),
                    reason: format!("Market value must be non-negative (got {})", bucket.market_value),
                });
            }
            if bucket.stress_loss_pct < Decimal::ZERO {
                return Err(LiquidityStressError::InvalidInput {
                    field: format!("profile.{}.stress_loss_pct", bucket.name),
                    reason: format!(
                        "Stress loss must be non-negative (got {})",
                        bucket.stress_loss_pct
                    ),
                });
            }
        }

        self.total_fund_value()?;
        Ok(())
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Bucket> {
        self.buckets.iter_mut().find(|b| b.name == name)
    }

    /// Sum of unstressed market values.
    ///
    /// Fails rather than panicking when the sum leaves the decimal range.
    pub fn total_fund_value(&self) -> LiquidityStressResult<Money> {
        self.buckets
            .iter()
            .try_fold(Decimal::ZERO, |total, b| total.checked_add(b.market_value))
            .ok_or_else(|| LiquidityStressError::InvalidInput {
                field: "profile.market_value".into(),
                reason: "Total fund value exceeds the representable range".into(),
            })
    }

    /// Copy of the profile with the named buckets marked unavailable.
    ///
    /// Naming a bucket the profile does not hold is a configuration error.
    pub fn with_frozen<S: AsRef<str>>(&self, names: &[S]) -> LiquidityStressResult<Profile> {
        let mut frozen = self.clone();
        for name in names {
            let name = name.as_ref();
            let bucket = frozen
                .get_mut(name)
                .ok_or_else(|| LiquidityStressError::UnknownBucket {
                    context: "freeze override".into(),
                    bucket: name.to_string(),
                })?;
            bucket.available = false;
        }
        Ok(frozen)
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

// ---------------------------------------------------------------------------
// Reference portfolio
// ---------------------------------------------------------------------------

pub const CASH_AND_SHORT_TERM_BONDS: &str = "Cash & Short-Term Bonds";
pub const PUBLIC_EQUITIES: &str = "Public Equities [T+1]";
pub const PUBLIC_CREDIT: &str = "Public Credit [T+5]";
pub const REAL_ESTATE: &str = "Real Estate [T+30]";
pub const INFRASTRUCTURE: &str = "Infrastructure [T+90]";
pub const PRIVATE_EQUITY: &str = "Private Equity [Locked]";

/// Illustrative institutional portfolio (CAD), 140bn in total.
///
/// Only buckets reachable within 30 days start out available; infrastructure
/// and private equity are frozen.
pub fn default_liquidity_profile() -> Profile {
    Profile {
        buckets: vec![
            Bucket::new(
                CASH_AND_SHORT_TERM_BONDS,
                Decimal::from(9_000_000_000i64),
                0,
                dec!(0.00),
                true,
            ),
            Bucket::new(
                PUBLIC_EQUITIES,
                Decimal::from(35_000_000_000i64),
                1,
                dec!(0.15),
                true,
            ),
            Bucket::new(
                PUBLIC_CREDIT,
                Decimal::from(20_000_000_000i64),
                5,
                dec!(0.08),
                true,
            ),
            Bucket::new(
                REAL_ESTATE,
                Decimal::from(16_000_000_000i64),
                30,
                dec!(0.20),
                true,
            ),
            Bucket::new(
                INFRASTRUCTURE,
                Decimal::from(25_000_000_000i64),
                90,
                dec!(0.25),
                false,
            ),
            Bucket::new(
                PRIVATE_EQUITY,
                Decimal::from(35_000_000_000i64),
                365,
                dec!(0.30),
                false,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_bucket_profile() -> Profile {
        Profile::new(vec![
            Bucket::new("A", dec!(100), 0, dec!(0.0), true),
            Bucket::new("B", dec!(100), 30, dec!(0.2), true),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_profile_total_value() {
        let profile = default_liquidity_profile();
        assert_eq!(profile.len(), 6);
        assert_eq!(profile.total_fund_value().unwrap(), Decimal::from(140_000_000_000i64));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_default_profile_long_dated_buckets_frozen() {
        let profile = default_liquidity_profile();
        assert!(!profile.get(INFRASTRUCTURE).unwrap().available);
        assert!(!profile.get(PRIVATE_EQUITY).unwrap().available);
        assert!(profile.get(REAL_ESTATE).unwrap().available);
    }

    #[test]
    fn test_empty_profile_rejected() {
        let err = Profile::new(vec![]).unwrap_err();
        assert!(matches!(err, LiquidityStressError::InsufficientData(_)));
    }

    #[test]
    fn test_duplicate_bucket_rejected() {
        let err = Profile::new(vec![
            Bucket::new("A", dec!(100), 0, dec!(0.0), true),
            Bucket::new("A", dec!(50), 5, dec!(0.1), true),
        ])
        .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(matches!(err, LiquidityStressError::DuplicateBucket(ref n) if n == "A"));
    }

    #[test]
    fn test_negative_market_value_rejected() {
        let err = Profile::new(vec![Bucket::new("A", dec!(-1), 0, dec!(0.0), true)]).unwrap_err();
        assert!(matches!(err, LiquidityStressError::InvalidInput { .. }));
    }

    #[test]
    fn test_negative_stress_loss_rejected() {
        let err =
            Profile::new(vec![Bucket::new("A", dec!(10), 0, dec!(-0.1), true)]).unwrap_err();
        assert!(matches!(err, LiquidityStressError::InvalidInput { .. }));
    }

    #[test]
    fn test_total_value_overflow_is_an_error() {
        let huge = Profile {
            buckets: vec![
                Bucket::new("A", Decimal::MAX, 0, dec!(0.0), true),
                Bucket::new("B", dec!(1), 5, dec!(0.0), true),
            ],
        };
        assert!(matches!(
            huge.total_fund_value(),
            Err(LiquidityStressError::InvalidInput { .. })
        ));
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_stress_loss_above_one_accepted() {
        // Accumulated losses are clamped later, not here
        assert!(Profile::new(vec![Bucket::new("A", dec!(10), 0, dec!(1.7), true)]).is_ok());
    }

    #[test]
    fn test_with_frozen_marks_bucket_unavailable() {
        let profile = two_bucket_profile();
        let frozen = profile.with_frozen(&["B"]).unwrap();
        assert!(!frozen.get("B").unwrap().available);
        assert!(frozen.get("A").unwrap().available);
        // Source profile untouched
        assert!(profile.get("B").unwrap().available);
    }

    #[test]
    fn test_with_frozen_unknown_bucket() {
        let err = two_bucket_profile().with_frozen(&["Z"]).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_liquidity_tiers() {
        assert_eq!(LiquidityTier::for_days(0), LiquidityTier::Immediate);
        assert_eq!(LiquidityTier::for_days(1), LiquidityTier::Immediate);
        assert_eq!(LiquidityTier::for_days(5), LiquidityTier::ShortTerm);
        assert_eq!(LiquidityTier::for_days(30), LiquidityTier::ShortTerm);
        assert_eq!(LiquidityTier::for_days(31), LiquidityTier::LongDated);
        assert_eq!(LiquidityTier::for_days(365), LiquidityTier::LongDated);
    }

    #[test]
    fn test_bucket_available_defaults_true_when_deserialised() {
        let bucket: Bucket = serde_json::from_value(serde_json::json!({
            "name": "Cash",
            "market_value": "100",
            "days_to_cash": 0,
            "stress_loss_pct": "0.0"
        }))
        .unwrap();
        assert!(bucket.available);
    }
}
