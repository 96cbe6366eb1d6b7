//! Thin wrappers over the distribution REST routes.

pub mod subscriptions;
