#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `strata-sdk` - core of the Strata BI client SDK
//!
//! - **Configuration** (`config`) - layered `SdkConfig` (defaults, YAML, `STRATA_*` env)
//! - **Connection** (`connection`) - project-scoped handle over a [`Transport`]
//! - **Transport** (`transport`) - `ApiRequest`/`ApiResponse` and the HTTP implementation
//! - **Field state** (`field`) - `Field<T>` for partially fetched / partially updated objects
//! - **Pagination** (`pager`) - offset/limit chunked Stream
//! - **Object routes** (`objects`) and **metadata search** (`search`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_sdk::{Connection, SdkConfig};
//!
//! let config = SdkConfig::load(Some("strata.yaml".as_ref()))?;
//! let conn = Connection::from_config(&config)?;
//! let info = strata_sdk::objects::get_object_info(&conn, "8D679D3711D3E4981000E787EC6DE8A4",
//!     strata_sdk::objects::ObjectType::Attribute).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod field;
pub mod json;
pub mod objects;
pub mod pager;
pub mod search;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use config::SdkConfig;
pub use connection::Connection;
pub use error::SdkError;
pub use field::Field;
pub use json::prune_nulls;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
