//! Errors of the HTTP client.

use thiserror::Error;

/// Why a base URL or request URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    ParseError,
    /// No host, e.g. `https:///api`.
    MissingAuthority,
    MissingScheme,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("cannot build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("bad header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("bad header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The whole exchange, body included, took longer than the configured
    /// request timeout.
    #[error("no answer within {0:?}")]
    Timeout(std::time::Duration),

    /// Connection refused or reset, DNS failure and other I/O errors.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("tls failure: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The body grew past `HttpClientConfig::max_body_size`.
    #[error("body of {actual} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize, actual: usize },

    #[error("bad json: {0}")]
    Json(#[from] serde_json::Error),

    /// Match on `kind`; `reason` is only meant for logs.
    #[error("bad url '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    /// Plain `http` under `TransportSecurity::TlsOnly`, or a scheme other
    /// than `http`/`https`.
    #[error("scheme '{scheme}' rejected: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_transport_keeps_io_source() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = HttpError::Transport(Box::new(refused));

        let source = err.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(source.kind(), std::io::ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), "transport failure: refused");
    }

    #[test]
    fn test_body_too_large_display() {
        let err = HttpError::BodyTooLarge { limit: 10, actual: 12 };
        assert_eq!(err.to_string(), "body of 12 bytes exceeds the 10 byte limit");
    }
}
