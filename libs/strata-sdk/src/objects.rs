//! Generic object routes shared by every metadata object type.

use crate::connection::Connection;
use crate::error::SdkError;
use crate::json::to_body;
use crate::transport::ApiRequest;
use serde::{Deserialize, Serialize};

/// Numeric object type codes used by the object routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Folder,
    Attribute,
    Fact,
    Table,
}

impl ObjectType {
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Folder => 8,
            Self::Attribute => 12,
            Self::Fact => 13,
            Self::Table => 15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ancestor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
}

/// Metadata common to all objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<u32>,
    pub subtype: Option<u32>,
    pub date_created: Option<String>,
    pub date_modified: Option<String>,
    pub version: Option<String>,
    pub owner: Option<UserRef>,
    pub ancestors: Vec<Ancestor>,
    pub hidden: Option<bool>,
    pub comments: Option<String>,
}

/// Partial update of [`ObjectInfo`]. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfoUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub folder_id: Option<String>,
    pub hidden: Option<bool>,
    pub comments: Option<String>,
    pub owner: Option<UserRef>,
}

impl ObjectInfoUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn object_path(id: &str) -> String {
    format!("/api/objects/{id}")
}

/// `GET /api/objects/{id}?type=`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn get_object_info(
    conn: &Connection,
    id: &str,
    object_type: ObjectType,
) -> Result<ObjectInfo, SdkError> {
    conn.send_json(ApiRequest::get(object_path(id)).query("type", object_type.code()))
        .await
}

/// `PUT /api/objects/{id}?type=`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn update_object_info(
    conn: &Connection,
    id: &str,
    object_type: ObjectType,
    update: &ObjectInfoUpdate,
) -> Result<ObjectInfo, SdkError> {
    let request = ApiRequest::put(object_path(id))
        .query("type", object_type.code())
        .json_value(to_body(update)?);
    let info: ObjectInfo = conn.send_json(request).await?;
    if conn.verbose() {
        tracing::info!(id, "updated object properties");
    }
    Ok(info)
}

/// `DELETE /api/objects/{id}?type=`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn delete_object(
    conn: &Connection,
    id: &str,
    object_type: ObjectType,
) -> Result<(), SdkError> {
    conn.send(ApiRequest::delete(object_path(id)).query("type", object_type.code()))
        .await?;
    if conn.verbose() {
        tracing::info!(id, object_type = object_type.code(), "deleted object");
    }
    Ok(())
}
