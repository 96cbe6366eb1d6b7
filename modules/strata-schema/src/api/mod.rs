//! Thin wrappers over the modeling REST routes.
//!
//! Each function maps to one route and returns the parsed body. Entity logic
//! lives in [`crate::attribute`].

pub mod attributes;
pub mod changesets;
pub mod hierarchies;
pub mod tables;
