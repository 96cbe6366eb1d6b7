//! Error types shared by every Strata SDK crate.

use thiserror::Error;

/// Errors returned by SDK operations.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The HTTP layer failed (connection, TLS, timeout, invalid URL).
    #[error("http error: {0}")]
    Http(#[from] strata_http::HttpError),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}{}: {message}", code_suffix(.code.as_deref()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server error code (e.g. `ERR004`), when the body carried one.
        code: Option<String>,
        /// Server message, or the raw body when it was not a JSON error.
        message: String,
    },

    /// A payload could not be serialized or deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration is invalid or could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A lookup by name or id found nothing.
    #[error("{kind} '{key}' not found")]
    NotFound {
        /// Kind of object looked up ("attribute", "subscription", ...).
        kind: &'static str,
        /// The name or id that was looked up.
        key: String,
    },

    /// The caller passed arguments that cannot be combined.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SdkError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of a server error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn code_suffix(code: Option<&str>) -> String {
    code.map(|c| format!(" ({c})")).unwrap_or_default()
}

impl From<figment::Error> for SdkError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_code() {
        let err = SdkError::Api {
            status: 400,
            code: Some("ERR001".to_owned()),
            message: "Invalid form".to_owned(),
        };
        assert_eq!(err.to_string(), "server returned 400 (ERR001): Invalid form");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_api_error_display_without_code() {
        let err = SdkError::Api {
            status: 502,
            code: None,
            message: "bad gateway".to_owned(),
        };
        assert_eq!(err.to_string(), "server returned 502: bad gateway");
    }

    #[test]
    fn test_not_found_display() {
        let err = SdkError::not_found("attribute", "Region");
        assert_eq!(err.to_string(), "attribute 'Region' not found");
        assert_eq!(err.status(), None);
    }
}
