#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `strata-schema` - schema modeling for the Strata BI client SDK
//!
//! - **Attributes** (`attribute`) - fetch, create, alter, batch writes and search
//! - **Forms** (`form`) and their **expressions** (`expression`)
//! - **Relationships** (`relationship`) between attributes
//! - **Validation** (`validation`) of forms, key form, displays and sorts
//! - **Routes** (`api`) - modeling REST routes and changesets
//!
//! Every write goes through a modeling changeset. Operations open and commit
//! their own changeset unless a caller-owned one is passed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_schema::{Attribute, AttributeAlter, ExpressionFormat};
//!
//! let mut region = Attribute::find_by_name(&conn, "Region", ExpressionFormat::Tree).await?;
//! region
//!     .alter(AttributeAlter {
//!         description: Some("Sales region".to_owned()),
//!         ..AttributeAlter::default()
//!     })
//!     .await?;
//! ```

pub mod api;
pub mod attribute;
pub mod error;
pub mod expression;
pub mod form;
pub mod references;
pub mod relationship;
pub mod validation;

pub use attribute::{
    Attribute, AttributeAlter, AttributeData, CreateAttributeDto, FormSource, ListAttributesQuery,
    RelationshipCandidates, UpdateAttributeDto, list_attributes, list_attributes_json,
};
pub use error::SchemaError;
pub use expression::{Expression, ExpressionFormat, FactExpression};
pub use form::{AttributeForm, FormUpdate, NewForm};
pub use references::{
    AttributeDisplays, AttributeSort, AttributeSorts, FormReference, ObjectSubType,
    SchemaObjectReference,
};
pub use relationship::{ChildSelector, Relationship, RelationshipChange, RelationshipType};
