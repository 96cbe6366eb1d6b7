use strata_sdk::SdkError;
use thiserror::Error;

/// Errors returned by distribution operations.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Arguments that cannot be combined, or that are missing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A subscription payload without a readable `delivery.mode`.
    #[error("subscription '{0}' has no delivery mode")]
    UnknownDeliveryMode(String),

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl DistributionError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for DistributionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Sdk(SdkError::Json(err))
    }
}
