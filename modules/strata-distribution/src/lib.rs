#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `strata-distribution` - subscriptions for the Strata BI client SDK
//!
//! - **Subscriptions** (`subscription`) - create, alter, execute, delete; typed per delivery mode
//! - **Delivery** (`delivery`) - delivery modes and cache update settings
//! - **Contents** (`content`) - delivered objects, schedules, recipients
//! - **Manager** (`manager`) - listing, bulk delete and execute, bursting and recipients lookups
//! - **Routes** (`api`) - subscription REST routes
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_distribution::{ListSubscriptionsQuery, SubscriptionManager, SubscriptionRef};
//!
//! let manager = SubscriptionManager::new(conn)?;
//! let subscriptions = manager.list_subscriptions(&ListSubscriptionsQuery::default()).await?;
//! let targets: Vec<SubscriptionRef> = subscriptions.iter().map(Into::into).collect();
//! let report = manager.execute(&targets).await?;
//! ```

pub mod api;
pub mod content;
pub mod delivery;
pub mod error;
pub mod manager;
pub mod subscription;

pub use content::{Content, ContentType, Recipient, ScheduleRef};
pub use delivery::{
    CacheSettings, CacheType, Delivery, DeliveryMode, LibraryCacheTypes, PersonalNotification,
    ShortcutCacheFormat,
};
pub use error::DistributionError;
pub use manager::{
    Confirm, ExecuteReport, ListSubscriptionsQuery, StdinConfirm, SubscriptionManager,
    SubscriptionRef,
};
pub use subscription::{
    AnySubscription, CacheUpdateSubscription, EmailSubscription, FileSubscription,
    FtpSubscription, HistoryListSubscription, MobileSubscription, NewSubscription, Subscription,
    SubscriptionAlter, SubscriptionDetails, SubscriptionKind,
};
