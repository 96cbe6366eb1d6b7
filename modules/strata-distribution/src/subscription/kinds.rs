use super::{NewSubscription, Subscription};
use crate::delivery::DeliveryMode;
use crate::error::DistributionError;
use std::ops::{Deref, DerefMut};
use strata_sdk::Connection;

macro_rules! subscription_kind {
    ($(#[$meta:meta])* $name:ident => $mode:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub(super) Subscription);

        impl $name {
            pub const MODE: DeliveryMode = $mode;

            /// Create a subscription with this type's delivery mode, whatever
            /// mode `new.delivery` carries.
            ///
            /// # Errors
            /// As [`Subscription::create`].
            pub async fn create(
                conn: &Connection,
                mut new: NewSubscription,
            ) -> Result<Self, DistributionError> {
                new.delivery.mode = Self::MODE;
                Subscription::create(conn, new).await.map(Self)
            }

            /// Fetch a subscription and check its delivery mode.
            ///
            /// # Errors
            /// Returns `DistributionError::InvalidInput` if the subscription
            /// has another delivery mode.
            pub async fn fetch(conn: &Connection, id: &str) -> Result<Self, DistributionError> {
                Self::try_from(Subscription::fetch(conn, id).await?)
            }

            #[must_use]
            pub fn into_inner(self) -> Subscription {
                self.0
            }
        }

        impl TryFrom<Subscription> for $name {
            type Error = DistributionError;

            fn try_from(subscription: Subscription) -> Result<Self, Self::Error> {
                if subscription.mode() == Self::MODE {
                    Ok(Self(subscription))
                } else {
                    Err(DistributionError::invalid_input(format!(
                        "Subscription '{}' has delivery mode {}, expected {}.",
                        subscription.id(),
                        subscription.mode(),
                        Self::MODE
                    )))
                }
            }
        }

        impl Deref for $name {
            type Target = Subscription;

            fn deref(&self) -> &Subscription {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Subscription {
                &mut self.0
            }
        }
    };
}

subscription_kind!(
    /// Refreshes caches. Missing cache settings default to reserved cache
    /// type and format for the web library.
    CacheUpdateSubscription => DeliveryMode::Cache
);
subscription_kind!(EmailSubscription => DeliveryMode::Email);
subscription_kind!(FileSubscription => DeliveryMode::File);
subscription_kind!(FtpSubscription => DeliveryMode::Ftp);
subscription_kind!(HistoryListSubscription => DeliveryMode::HistoryList);
subscription_kind!(MobileSubscription => DeliveryMode::Mobile);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::tests::{conn, payload};
    use super::*;
    use crate::content::{Content, ContentType};
    use crate::delivery::{CacheSettings, CacheType, Delivery, LibraryCacheTypes};
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_cache_create_fills_defaults_and_pins_mode() {
        let (mock, conn) = conn();
        mock.ok(Method::POST, "/api/subscriptions", &payload("S1", "CACHE"));

        let new = NewSubscription::new(
            "Warm caches",
            Content::new("D1", ContentType::Dossier),
            Delivery::new(DeliveryMode::Email),
        );
        let subscription = CacheUpdateSubscription::create(&conn, new).await.unwrap();

        assert_eq!(subscription.mode(), DeliveryMode::Cache);
        let body = mock.requests_to(&Method::POST, "/api/subscriptions")[0].body.clone().unwrap();
        assert_eq!(body["delivery"]["mode"], "CACHE");
        assert_eq!(
            body["delivery"]["cache"],
            json!({
                "cacheType": "RESERVED",
                "shortcutCacheFormat": "RESERVED",
                "libraryCacheTypes": ["WEB"],
                "reuseDatasetCache": false,
                "isAllLibraryUsers": false
            })
        );
        assert_eq!(body["delivery"]["contactSecurity"], true);
    }

    #[tokio::test]
    async fn test_cache_create_keeps_given_settings() {
        let (mock, conn) = conn();
        mock.ok(Method::POST, "/api/subscriptions", &payload("S1", "CACHE"));

        let settings = CacheSettings {
            cache_type: CacheType::Shortcut,
            library_cache_types: vec![LibraryCacheTypes::Ios, LibraryCacheTypes::Android],
            ..CacheSettings::default()
        };
        let new = NewSubscription::new(
            "Warm caches",
            Content::new("D1", ContentType::Dossier),
            Delivery::cache(settings),
        );
        CacheUpdateSubscription::create(&conn, new).await.unwrap();

        let body = mock.requests_to(&Method::POST, "/api/subscriptions")[0].body.clone().unwrap();
        assert_eq!(body["delivery"]["cache"]["cacheType"], "SHORTCUT");
        assert_eq!(body["delivery"]["cache"]["libraryCacheTypes"], json!(["IOS", "ANDROID"]));
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_mode() {
        let (mock, conn) = conn();
        mock.ok(Method::GET, "/api/subscriptions/S1", &payload("S1", "EMAIL"));

        assert!(EmailSubscription::fetch(&conn, "S1").await.is_ok());
        let err = FtpSubscription::fetch(&conn, "S1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: Subscription 'S1' has delivery mode EMAIL, expected FTP."
        );
    }
}
