//! Bulk operations over the subscriptions of one project.

use crate::api::subscriptions as subscriptions_api;
use crate::content::{Content, ContentType};
use crate::delivery::DeliveryMode;
use crate::error::DistributionError;
use crate::subscription::{AnySubscription, Subscription};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};
use strata_sdk::pager::{Chunk, OffsetPager};
use strata_sdk::Connection;

/// Subscriptions requested per page when listing.
pub const LIST_CHUNK_SIZE: usize = 1000;

const DELETE_PROMPT: &str = "Are you sure you want to delete all of them? [Y/N]: ";

/// Asks the user to confirm a destructive operation.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Prompts on stdout and accepts exactly `Y` on stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = io::stdout().lock();
        if write!(stdout, "{prompt}").and_then(|()| stdout.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim_end_matches(['\r', '\n']) == "Y",
            Err(_) => false,
        }
    }
}

/// A subscription to act on: a loaded one, or just its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRef {
    pub id: String,
    pub name: Option<String>,
    pub mode: Option<DeliveryMode>,
}

impl From<&str> for SubscriptionRef {
    fn from(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: None,
            mode: None,
        }
    }
}

impl From<&Subscription> for SubscriptionRef {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id().to_owned(),
            name: Some(subscription.name().to_owned()),
            mode: Some(subscription.mode()),
        }
    }
}

impl From<&AnySubscription> for SubscriptionRef {
    fn from(subscription: &AnySubscription) -> Self {
        subscription.as_subscription().into()
    }
}

impl SubscriptionRef {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("Subscription '{name}' with ID '{}'", self.id),
            None => format!("Subscription with ID '{}'", self.id),
        }
    }
}

/// Filters of a subscription listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListSubscriptionsQuery {
    pub limit: Option<usize>,
    /// Include the time of the last run.
    pub last_run: bool,
    /// Keep only subscriptions whose top-level `key` equals the value.
    pub filters: Vec<(String, Value)>,
}

impl ListSubscriptionsQuery {
    fn matches(&self, item: &Value) -> bool {
        self.filters
            .iter()
            .all(|(key, value)| item.get(key) == Some(value))
    }
}

/// Outcome of [`SubscriptionManager::execute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteReport {
    pub executed: Vec<String>,
    /// Subscriptions whose delivery mode cannot be executed on demand.
    pub skipped: Vec<String>,
}

pub struct SubscriptionManager {
    conn: Connection,
    confirm: Box<dyn Confirm>,
}

impl SubscriptionManager {
    /// Manager for the connection's project, confirming on stdin.
    ///
    /// # Errors
    /// Returns `SdkError::InvalidInput` (wrapped) if no project is selected.
    pub fn new(conn: Connection) -> Result<Self, DistributionError> {
        conn.require_project()?;
        Ok(Self {
            conn,
            confirm: Box::new(StdinConfirm),
        })
    }

    #[must_use]
    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    /// Raw subscription payloads, read in chunks of [`LIST_CHUNK_SIZE`].
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn list_subscriptions_json(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<Vec<Value>, DistributionError> {
        let conn = &self.conn;
        let last_run = query.last_run;
        let fetch_limit = if query.filters.is_empty() { query.limit } else { None };
        let items: Vec<Value> = OffsetPager::new(LIST_CHUNK_SIZE, fetch_limit, |chunk: Chunk| async move {
            subscriptions_api::list_subscriptions(conn, chunk.offset, chunk.limit, last_run).await
        })
        .try_collect()
        .await?;

        Ok(items
            .into_iter()
            .filter(|item| query.matches(item))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    /// Subscriptions wrapped in the type of their delivery mode.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures and
    /// `DistributionError::UnknownDeliveryMode` for payloads without a mode.
    pub async fn list_subscriptions(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<Vec<AnySubscription>, DistributionError> {
        self.list_subscriptions_json(query)
            .await?
            .into_iter()
            .map(|payload| AnySubscription::dispatch(&self.conn, payload))
            .collect()
    }

    /// Delete every subscription in `subscriptions`.
    ///
    /// Unless `force` is set, the user is asked to confirm first. A failed
    /// deletion is logged and does not stop the others.
    ///
    /// Returns `true` only if every subscription was deleted.
    pub async fn delete(&self, subscriptions: &[SubscriptionRef], force: bool) -> bool {
        if subscriptions.is_empty() {
            if self.conn.verbose() {
                tracing::info!("No subscriptions passed.");
            }
            return false;
        }
        if !force {
            tracing::info!("Found subscriptions:");
            for subscription in subscriptions {
                tracing::info!("{}", subscription.label());
            }
            if !self.confirm.confirm(DELETE_PROMPT) {
                return false;
            }
        }

        let mut deleted = 0;
        for subscription in subscriptions {
            match subscriptions_api::remove_subscription(&self.conn, &subscription.id).await {
                Ok(()) => {
                    deleted += 1;
                    if self.conn.verbose() {
                        tracing::info!("Deleted {}.", subscription.label());
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "{} could not be deleted.", subscription.label());
                }
            }
        }
        deleted == subscriptions.len()
    }

    /// Execute subscriptions now.
    ///
    /// Only email, file, history list and FTP deliveries can be executed;
    /// others are skipped with a warning. Subscriptions given by id are
    /// fetched to learn their delivery mode.
    ///
    /// # Errors
    /// Returns the first server failure; subscriptions before it have run.
    pub async fn execute(
        &self,
        subscriptions: &[SubscriptionRef],
    ) -> Result<ExecuteReport, DistributionError> {
        let mut report = ExecuteReport::default();
        if subscriptions.is_empty() {
            if self.conn.verbose() {
                tracing::info!("No subscriptions passed.");
            }
            return Ok(report);
        }

        for target in subscriptions {
            let target = match target.mode {
                Some(_) => target.clone(),
                None => SubscriptionRef::from(&Subscription::fetch(&self.conn, &target.id).await?),
            };
            let mode = target.mode.unwrap_or(DeliveryMode::Unsupported);
            if mode.is_executable() {
                subscriptions_api::send_subscription(&self.conn, &target.id).await?;
                if self.conn.verbose() {
                    tracing::info!("Executed {}.", target.label());
                }
                report.executed.push(target.id);
            } else {
                tracing::warn!(
                    "{} could not be executed. Delivery mode '{mode}' is not supported.",
                    target.label()
                );
                report.skipped.push(target.id);
            }
        }
        Ok(report)
    }

    /// Attributes available for bursting the given content.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn available_bursting_attributes(
        &self,
        content: &Content,
    ) -> Result<Vec<Value>, DistributionError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Bursting {
            #[serde(default)]
            bursting_attributes: Vec<Value>,
        }
        let response = subscriptions_api::bursting_attributes(
            &self.conn,
            &content.id,
            content.content_type.as_str(),
        )
        .await?;
        let bursting: Bursting = serde_json::from_value(response)?;
        Ok(bursting.bursting_attributes)
    }

    /// Recipients available for a content and delivery type (email when
    /// `None`).
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn available_recipients(
        &self,
        content_id: &str,
        content_type: ContentType,
        delivery_type: Option<DeliveryMode>,
    ) -> Result<Vec<Value>, DistributionError> {
        #[derive(Deserialize)]
        struct Recipients {
            #[serde(default)]
            recipients: Vec<Value>,
        }
        let body = json!({"contents": [{"id": content_id, "type": content_type}]});
        let delivery_type = delivery_type.unwrap_or(DeliveryMode::Email);
        let response =
            subscriptions_api::available_recipients(&self.conn, body, delivery_type.as_str()).await?;
        let recipients: Recipients = serde_json::from_value(response)?;
        Ok(recipients.recipients)
    }
}
