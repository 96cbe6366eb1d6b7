use strata_sdk::SdkError;
use thiserror::Error;

/// Errors returned by schema operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Forms, key form, displays or sorts do not fit together.
    ///
    /// Raised locally, before anything is sent to the server.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Arguments that cannot be combined, or that point at nothing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport, server or payload failure.
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl SchemaError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Sdk(SdkError::Json(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_errors_display_transparently() {
        let err = SchemaError::from(SdkError::not_found("attribute", "Region"));
        assert_eq!(err.to_string(), "attribute 'Region' not found");
    }

    #[test]
    fn test_validation_display() {
        let err = SchemaError::validation("`forms` can not be empty.");
        assert_eq!(err.to_string(), "validation failed: `forms` can not be empty.");
    }
}
