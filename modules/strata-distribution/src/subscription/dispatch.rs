use super::Subscription;
use super::kinds::{
    CacheUpdateSubscription, EmailSubscription, FileSubscription, FtpSubscription,
    HistoryListSubscription, MobileSubscription,
};
use crate::delivery::DeliveryMode;
use crate::error::DistributionError;
use serde_json::Value;
use strata_sdk::Connection;

/// Concrete subscription type for a delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    CacheUpdate,
    Email,
    File,
    Ftp,
    HistoryList,
    Mobile,
    /// Modes without a dedicated type.
    Generic,
}

const KIND_BY_MODE: [(DeliveryMode, SubscriptionKind); 6] = [
    (DeliveryMode::Cache, SubscriptionKind::CacheUpdate),
    (DeliveryMode::Email, SubscriptionKind::Email),
    (DeliveryMode::File, SubscriptionKind::File),
    (DeliveryMode::Ftp, SubscriptionKind::Ftp),
    (DeliveryMode::HistoryList, SubscriptionKind::HistoryList),
    (DeliveryMode::Mobile, SubscriptionKind::Mobile),
];

impl SubscriptionKind {
    #[must_use]
    pub fn from_mode(mode: DeliveryMode) -> Self {
        KIND_BY_MODE
            .iter()
            .find(|(m, _)| *m == mode)
            .map_or(Self::Generic, |(_, kind)| *kind)
    }
}

/// A subscription wrapped in the type matching its delivery mode.
#[derive(Debug, Clone)]
pub enum AnySubscription {
    CacheUpdate(CacheUpdateSubscription),
    Email(EmailSubscription),
    File(FileSubscription),
    Ftp(FtpSubscription),
    HistoryList(HistoryListSubscription),
    Mobile(MobileSubscription),
    Generic(Subscription),
}

impl AnySubscription {
    /// Build the typed subscription for a server payload, selected by its
    /// `delivery.mode`.
    ///
    /// # Errors
    /// Returns `DistributionError::UnknownDeliveryMode` if the payload has no
    /// delivery mode, and a JSON error if it is malformed.
    pub fn dispatch(conn: &Connection, payload: Value) -> Result<Self, DistributionError> {
        let mode = payload
            .pointer("/delivery/mode")
            .cloned()
            .ok_or_else(|| {
                let id = payload.get("id").and_then(Value::as_str).unwrap_or_default();
                DistributionError::UnknownDeliveryMode(id.to_owned())
            })?;
        let mode: DeliveryMode = serde_json::from_value(mode)?;
        let subscription = Subscription::from_payload(conn.clone(), payload)?;
        Ok(Self::wrap(SubscriptionKind::from_mode(mode), subscription))
    }

    /// Fetch a subscription and wrap it in its typed form.
    ///
    /// # Errors
    /// As [`Subscription::fetch`].
    pub async fn fetch(conn: &Connection, id: &str) -> Result<Self, DistributionError> {
        let subscription = Subscription::fetch(conn, id).await?;
        Ok(Self::from(subscription))
    }

    fn wrap(kind: SubscriptionKind, subscription: Subscription) -> Self {
        match kind {
            SubscriptionKind::CacheUpdate => Self::CacheUpdate(CacheUpdateSubscription(subscription)),
            SubscriptionKind::Email => Self::Email(EmailSubscription(subscription)),
            SubscriptionKind::File => Self::File(FileSubscription(subscription)),
            SubscriptionKind::Ftp => Self::Ftp(FtpSubscription(subscription)),
            SubscriptionKind::HistoryList => Self::HistoryList(HistoryListSubscription(subscription)),
            SubscriptionKind::Mobile => Self::Mobile(MobileSubscription(subscription)),
            SubscriptionKind::Generic => Self::Generic(subscription),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SubscriptionKind {
        match self {
            Self::CacheUpdate(_) => SubscriptionKind::CacheUpdate,
            Self::Email(_) => SubscriptionKind::Email,
            Self::File(_) => SubscriptionKind::File,
            Self::Ftp(_) => SubscriptionKind::Ftp,
            Self::HistoryList(_) => SubscriptionKind::HistoryList,
            Self::Mobile(_) => SubscriptionKind::Mobile,
            Self::Generic(_) => SubscriptionKind::Generic,
        }
    }

    #[must_use]
    pub fn as_subscription(&self) -> &Subscription {
        match self {
            Self::CacheUpdate(s) => &s.0,
            Self::Email(s) => &s.0,
            Self::File(s) => &s.0,
            Self::Ftp(s) => &s.0,
            Self::HistoryList(s) => &s.0,
            Self::Mobile(s) => &s.0,
            Self::Generic(s) => s,
        }
    }

    #[must_use]
    pub fn into_subscription(self) -> Subscription {
        match self {
            Self::CacheUpdate(s) => s.into_inner(),
            Self::Email(s) => s.into_inner(),
            Self::File(s) => s.into_inner(),
            Self::Ftp(s) => s.into_inner(),
            Self::HistoryList(s) => s.into_inner(),
            Self::Mobile(s) => s.into_inner(),
            Self::Generic(s) => s,
        }
    }
}

impl From<Subscription> for AnySubscription {
    fn from(subscription: Subscription) -> Self {
        Self::wrap(SubscriptionKind::from_mode(subscription.mode()), subscription)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::tests::{conn, payload};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_table_falls_back_to_generic() {
        assert_eq!(SubscriptionKind::from_mode(DeliveryMode::Cache), SubscriptionKind::CacheUpdate);
        assert_eq!(
            SubscriptionKind::from_mode(DeliveryMode::HistoryList),
            SubscriptionKind::HistoryList
        );
        assert_eq!(SubscriptionKind::from_mode(DeliveryMode::Printer), SubscriptionKind::Generic);
        assert_eq!(
            SubscriptionKind::from_mode(DeliveryMode::Unsupported),
            SubscriptionKind::Generic
        );
    }

    #[test]
    fn test_dispatch_by_delivery_mode() {
        let (_mock, conn) = conn();

        let any = AnySubscription::dispatch(&conn, payload("S1", "FTP")).unwrap();
        assert_eq!(any.kind(), SubscriptionKind::Ftp);
        assert!(matches!(&any, AnySubscription::Ftp(s) if s.id() == "S1"));

        let any = AnySubscription::dispatch(&conn, payload("S2", "PRINTER")).unwrap();
        assert_eq!(any.kind(), SubscriptionKind::Generic);
        assert_eq!(any.as_subscription().mode(), DeliveryMode::Printer);
        assert_eq!(any.into_subscription().id(), "S2");
    }

    #[test]
    fn test_dispatch_without_mode_fails() {
        let (_mock, conn) = conn();
        let err = AnySubscription::dispatch(&conn, json!({"id": "S9", "name": "x"})).unwrap_err();
        assert!(matches!(err, DistributionError::UnknownDeliveryMode(id) if id == "S9"));
    }
}
