#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client used by the Strata SDK crates
//!
//! A hyper-based client with:
//! - TLS via rustls (HTTPS only by default)
//! - Connection pooling
//! - Per-request timeouts
//! - User-Agent header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//!
//! Body size limits apply to **decompressed** bytes.
//!
//! # Example
//!
//! ```ignore
//! use strata_http::{HttpClientBuilder, HttpClientConfig};
//!
//! let client = HttpClientBuilder::with_config(HttpClientConfig::default()).build()?;
//! let response = client
//!     .request(http::Method::GET, "https://bi.example.com/api/objects/0A1B?type=12")
//!     .sensitive_header("x-auth-token", &token)
//!     .send()
//!     .await?;
//! let status = response.status();
//! let body = response.bytes().await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{UserAgentLayer, UserAgentService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
