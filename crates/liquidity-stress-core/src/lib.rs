pub mod error;
pub mod liquidity;
pub mod portfolio;
pub mod types;

pub use error::LiquidityStressError;
pub use types::*;

/// Standard result type for all liquidity-stress operations
pub type LiquidityStressResult<T> = Result<T, LiquidityStressError>;
