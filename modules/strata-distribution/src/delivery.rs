//! Delivery settings of a subscription.
//!
//! Only cache delivery is modeled field by field. The settings blocks of the
//! other modes (`email`, `file`, `ftp`, ...) are carried as raw JSON so that
//! a fetched subscription can be written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    Email,
    File,
    Printer,
    HistoryList,
    Cache,
    Mobile,
    Ftp,
    /// Any mode this client does not know.
    #[serde(other)]
    Unsupported,
}

impl DeliveryMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::File => "FILE",
            Self::Printer => "PRINTER",
            Self::HistoryList => "HISTORY_LIST",
            Self::Cache => "CACHE",
            Self::Mobile => "MOBILE",
            Self::Ftp => "FTP",
            Self::Unsupported => "UNSUPPORTED",
        }
    }

    /// Modes the server can execute on demand.
    #[must_use]
    pub fn is_executable(self) -> bool {
        matches!(self, Self::Email | Self::File | Self::HistoryList | Self::Ftp)
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheType {
    #[default]
    Reserved,
    Shortcut,
    ShortcutWithBookmark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShortcutCacheFormat {
    #[default]
    Reserved,
    Json,
    Binary,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LibraryCacheTypes {
    #[serde(alias = "web")]
    Web,
    #[serde(alias = "android")]
    Android,
    #[serde(alias = "ios")]
    Ios,
}

/// Settings of a cache update delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    #[serde(default)]
    pub cache_type: CacheType,
    #[serde(default)]
    pub shortcut_cache_format: ShortcutCacheFormat,
    #[serde(default = "default_library_cache_types")]
    pub library_cache_types: Vec<LibraryCacheTypes>,
    #[serde(default)]
    pub reuse_dataset_cache: bool,
    #[serde(default)]
    pub is_all_library_users: bool,
}

pub(crate) fn default_library_cache_types() -> Vec<LibraryCacheTypes> {
    vec![LibraryCacheTypes::Web]
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_type: CacheType::default(),
            shortcut_cache_format: ShortcutCacheFormat::default(),
            library_cache_types: default_library_cache_types(),
            reuse_dataset_cache: false,
            is_all_library_users: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalNotification {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub mode: DeliveryMode,
    /// `yyyy-MM-dd`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time_zone: Option<String>,
    #[serde(default = "default_true")]
    pub contact_security: bool,
    /// Message sent along with the delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_notification: Option<PersonalNotification>,
    /// Settings blocks of the other modes, keyed as on the wire.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Delivery {
    #[must_use]
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            mode,
            expiration: None,
            expiration_time_zone: None,
            contact_security: true,
            custom_msg: None,
            cache: None,
            personal_notification: None,
            settings: Map::new(),
        }
    }

    /// Cache update delivery.
    #[must_use]
    pub fn cache(settings: CacheSettings) -> Self {
        Self {
            cache: Some(settings),
            ..Self::new(DeliveryMode::Cache)
        }
    }

    /// Attach the raw settings block of a mode, e.g. `("email", {...})`.
    #[must_use]
    pub fn with_settings(mut self, key: impl Into<String>, settings: Value) -> Self {
        self.settings.insert(key.into(), settings);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_wire_names() {
        let mode: DeliveryMode = serde_json::from_value(json!("HISTORY_LIST")).unwrap();
        assert_eq!(mode, DeliveryMode::HistoryList);
        let mode: DeliveryMode = serde_json::from_value(json!("SNAIL_MAIL")).unwrap();
        assert_eq!(mode, DeliveryMode::Unsupported);
        assert_eq!(serde_json::to_value(DeliveryMode::Ftp).unwrap(), json!("FTP"));
        assert!(DeliveryMode::Ftp.is_executable());
        assert!(!DeliveryMode::Cache.is_executable());
        assert!(!DeliveryMode::Mobile.is_executable());
    }

    #[test]
    fn test_cache_settings_defaults() {
        let settings: CacheSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings, CacheSettings::default());
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "cacheType": "RESERVED",
                "shortcutCacheFormat": "RESERVED",
                "libraryCacheTypes": ["WEB"],
                "reuseDatasetCache": false,
                "isAllLibraryUsers": false
            })
        );
        let value = serde_json::to_value(CacheType::ShortcutWithBookmark).unwrap();
        assert_eq!(value, json!("SHORTCUTWITHBOOKMARK"));
    }

    #[test]
    fn test_other_mode_settings_survive_round_trip() {
        let raw = json!({
            "mode": "EMAIL",
            "contactSecurity": false,
            "email": {"subject": "Daily", "sendContentAs": "data"}
        });
        let delivery: Delivery = serde_json::from_value(raw.clone()).unwrap();
        assert!(!delivery.contact_security);
        assert_eq!(delivery.settings["email"]["subject"], "Daily");
        assert_eq!(serde_json::to_value(&delivery).unwrap(), raw);
    }
}
