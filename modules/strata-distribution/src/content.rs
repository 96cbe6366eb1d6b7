//! Contents, schedules and recipients of a subscription.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Report,
    Document,
    Cube,
    Dossier,
    #[serde(other)]
    Unsupported,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "REPORT",
            Self::Document => "DOCUMENT",
            Self::Cube => "CUBE",
            Self::Dossier => "DOSSIER",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

/// An object delivered by a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Format and prompt answers, passed through as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_condition: Option<Value>,
}

impl Content {
    #[must_use]
    pub fn new(id: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id: id.into(),
            content_type,
            name: None,
            personalization: None,
            refresh_condition: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&str> for ScheduleRef {
    fn from(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `USER`, `USER_GROUP`, `CONTACT`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub recipient_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_type: Option<String>,
}

impl From<&str> for Recipient {
    fn from(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: None,
            recipient_type: None,
            include_type: None,
        }
    }
}
