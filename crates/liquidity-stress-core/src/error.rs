use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiquidityStressError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {context} references unknown bucket '{bucket}'")]
    UnknownBucket { context: String, bucket: String },

    #[error("Configuration error: bucket '{0}' appears more than once in the profile")]
    DuplicateBucket(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LiquidityStressError {
    /// True for errors caused by reference data that does not bind together
    /// (rules or overrides naming buckets the profile does not have).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LiquidityStressError::UnknownBucket { .. } | LiquidityStressError::DuplicateBucket(_)
        )
    }
}

impl From<serde_json::Error> for LiquidityStressError {
    fn from(e: serde_json::Error) -> Self {
        LiquidityStressError::SerializationError(e.to_string())
    }
}
