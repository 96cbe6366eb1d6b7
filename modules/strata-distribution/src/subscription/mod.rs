//! Subscriptions and their delivery-mode specific types.
//!
//! [`Subscription`] carries the behavior shared by every delivery mode. The
//! typed wrappers in [`kinds`] pin the delivery mode on creation, and
//! [`AnySubscription`] picks the wrapper matching a server payload.

mod dispatch;
mod kinds;

pub use dispatch::{AnySubscription, SubscriptionKind};
pub use kinds::{
    CacheUpdateSubscription, EmailSubscription, FileSubscription, FtpSubscription,
    HistoryListSubscription, MobileSubscription,
};

use crate::api::subscriptions as subscriptions_api;
use crate::content::{Content, Recipient, ScheduleRef};
use crate::delivery::{CacheSettings, Delivery, DeliveryMode, default_library_cache_types};
use crate::error::DistributionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_sdk::json::to_body;
use strata_sdk::objects::UserRef;
use strata_sdk::Connection;

/// A subscription as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub allow_delivery_changes: Option<bool>,
    #[serde(default)]
    pub allow_personalization_changes: Option<bool>,
    #[serde(default)]
    pub allow_unsubscribe: Option<bool>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub owner: Option<UserRef>,
    #[serde(default)]
    pub schedules: Vec<ScheduleRef>,
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    pub delivery: Delivery,
    /// Only present when listed with `last_run`.
    #[serde(default)]
    pub last_run: Option<String>,
}

/// Definition of a subscription to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub name: String,
    pub contents: Vec<Content>,
    pub schedules: Vec<ScheduleRef>,
    /// Empty means the connected user.
    pub recipients: Vec<Recipient>,
    pub delivery: Delivery,
    pub allow_delivery_changes: Option<bool>,
    pub allow_personalization_changes: Option<bool>,
    pub allow_unsubscribe: Option<bool>,
    pub send_now: Option<bool>,
    /// Defaults to the connected user on the server.
    pub owner_id: Option<String>,
}

impl NewSubscription {
    #[must_use]
    pub fn new(name: impl Into<String>, content: Content, delivery: Delivery) -> Self {
        Self {
            name: name.into(),
            contents: vec![content],
            schedules: Vec::new(),
            recipients: Vec::new(),
            delivery,
            allow_delivery_changes: None,
            allow_personalization_changes: None,
            allow_unsubscribe: None,
            send_now: None,
            owner_id: None,
        }
    }

    #[must_use]
    pub fn schedule(mut self, schedule: impl Into<ScheduleRef>) -> Self {
        self.schedules.push(schedule.into());
        self
    }

    #[must_use]
    pub fn recipient(mut self, recipient: impl Into<Recipient>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    #[must_use]
    pub fn send_now(mut self, send_now: bool) -> Self {
        self.send_now = Some(send_now);
        self
    }
}

/// Changes for [`Subscription::alter`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionAlter {
    pub name: Option<String>,
    pub contents: Option<Vec<Content>>,
    pub schedules: Option<Vec<ScheduleRef>>,
    pub recipients: Option<Vec<Recipient>>,
    pub delivery: Option<Delivery>,
    /// Written into the delivery, over any message it already carries.
    pub custom_msg: Option<String>,
    pub allow_delivery_changes: Option<bool>,
    pub allow_personalization_changes: Option<bool>,
    pub allow_unsubscribe: Option<bool>,
    pub send_now: Option<bool>,
    pub owner_id: Option<String>,
}

/// Body of the create and update routes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionBody<'a> {
    name: &'a str,
    allow_delivery_changes: Option<bool>,
    allow_personalization_changes: Option<bool>,
    allow_unsubscribe: Option<bool>,
    send_now: Option<bool>,
    owner: Option<UserRef>,
    schedules: &'a [ScheduleRef],
    contents: &'a [Content],
    recipients: &'a [Recipient],
    delivery: &'a Delivery,
}

/// Cache deliveries always carry cache settings with at least one library
/// cache type.
fn prepare_delivery(delivery: &mut Delivery) {
    if delivery.mode != DeliveryMode::Cache {
        return;
    }
    let cache = delivery.cache.get_or_insert_with(CacheSettings::default);
    if cache.library_cache_types.is_empty() {
        cache.library_cache_types = default_library_cache_types();
    }
}

#[derive(Debug, Clone)]
pub struct Subscription {
    conn: Connection,
    details: SubscriptionDetails,
}

impl Subscription {
    pub(crate) fn from_payload(conn: Connection, payload: Value) -> Result<Self, DistributionError> {
        Ok(Self {
            conn,
            details: serde_json::from_value(payload)?,
        })
    }

    /// Fetch a subscription by id.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures or when no project is
    /// selected.
    pub async fn fetch(conn: &Connection, id: &str) -> Result<Self, DistributionError> {
        conn.require_project()?;
        let payload = subscriptions_api::get_subscription(conn, id).await?;
        Self::from_payload(conn.clone(), payload)
    }

    /// Create a subscription.
    ///
    /// # Errors
    /// Returns `DistributionError::InvalidInput` for an empty name or no
    /// contents, before any request.
    pub async fn create(conn: &Connection, mut new: NewSubscription) -> Result<Self, DistributionError> {
        conn.require_project()?;
        if new.name.trim().is_empty() {
            return Err(DistributionError::invalid_input("Subscription name can not be empty."));
        }
        if new.contents.is_empty() {
            return Err(DistributionError::invalid_input(
                "Please provide at least one content for the subscription.",
            ));
        }
        prepare_delivery(&mut new.delivery);

        let body = to_body(&SubscriptionBody {
            name: &new.name,
            allow_delivery_changes: new.allow_delivery_changes,
            allow_personalization_changes: new.allow_personalization_changes,
            allow_unsubscribe: new.allow_unsubscribe,
            send_now: new.send_now,
            owner: new.owner_id.map(|id| UserRef { id, name: None }),
            schedules: &new.schedules,
            contents: &new.contents,
            recipients: &new.recipients,
            delivery: &new.delivery,
        })?;
        let payload = subscriptions_api::create_subscription(conn, body).await?;
        let subscription = Self::from_payload(conn.clone(), payload)?;
        if conn.verbose() {
            tracing::info!(
                name = %subscription.name(),
                id = %subscription.id(),
                mode = %subscription.mode(),
                "created subscription"
            );
        }
        Ok(subscription)
    }

    /// Change the subscription. The full definition is written back with
    /// the supplied values replacing the current ones.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn alter(&mut self, changes: SubscriptionAlter) -> Result<(), DistributionError> {
        let SubscriptionAlter {
            name,
            contents,
            schedules,
            recipients,
            delivery,
            custom_msg,
            allow_delivery_changes,
            allow_personalization_changes,
            allow_unsubscribe,
            send_now,
            owner_id,
        } = changes;

        let current = &self.details;
        let mut delivery = delivery.unwrap_or_else(|| current.delivery.clone());
        if let Some(msg) = custom_msg {
            delivery.custom_msg = Some(msg);
        }
        prepare_delivery(&mut delivery);
        let owner = owner_id
            .map(|id| UserRef { id, name: None })
            .or_else(|| current.owner.clone());
        let body = to_body(&SubscriptionBody {
            name: name.as_deref().unwrap_or(&current.name),
            allow_delivery_changes: allow_delivery_changes.or(current.allow_delivery_changes),
            allow_personalization_changes: allow_personalization_changes
                .or(current.allow_personalization_changes),
            allow_unsubscribe: allow_unsubscribe.or(current.allow_unsubscribe),
            send_now,
            owner,
            schedules: schedules.as_deref().unwrap_or(&current.schedules),
            contents: contents.as_deref().unwrap_or(&current.contents),
            recipients: recipients.as_deref().unwrap_or(&current.recipients),
            delivery: &delivery,
        })?;

        let payload = subscriptions_api::update_subscription(&self.conn, &current.id, body).await?;
        self.details = serde_json::from_value(payload)?;
        if self.conn.verbose() {
            tracing::info!(name = %self.name(), id = %self.id(), "updated subscription");
        }
        Ok(())
    }

    /// Send the subscription now.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn execute(&self) -> Result<(), DistributionError> {
        subscriptions_api::send_subscription(&self.conn, self.id()).await?;
        if self.conn.verbose() {
            tracing::info!(name = %self.name(), id = %self.id(), "executed subscription");
        }
        Ok(())
    }

    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn delete(self) -> Result<(), DistributionError> {
        subscriptions_api::remove_subscription(&self.conn, self.id()).await?;
        if self.conn.verbose() {
            tracing::info!(name = %self.name(), id = %self.id(), "deleted subscription");
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.details.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.details.name
    }

    #[must_use]
    pub fn mode(&self) -> DeliveryMode {
        self.details.delivery.mode
    }

    #[must_use]
    pub fn delivery(&self) -> &Delivery {
        &self.details.delivery
    }

    #[must_use]
    pub fn contents(&self) -> &[Content] {
        &self.details.contents
    }

    #[must_use]
    pub fn schedules(&self) -> &[ScheduleRef] {
        &self.details.schedules
    }

    #[must_use]
    pub fn recipients(&self) -> &[Recipient] {
        &self.details.recipients
    }

    #[must_use]
    pub fn owner(&self) -> Option<&UserRef> {
        self.details.owner.as_ref()
    }

    #[must_use]
    pub fn last_run(&self) -> Option<&str> {
        self.details.last_run.as_deref()
    }

    #[must_use]
    pub fn details(&self) -> &SubscriptionDetails {
        &self.details
    }
}
