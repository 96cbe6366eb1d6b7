use crate::relationship::Relationship;
use serde::{Deserialize, Serialize};
use strata_sdk::{ApiRequest, Connection, SdkError};

#[derive(Debug, Serialize, Deserialize)]
struct RelationshipsBody {
    #[serde(default)]
    relationships: Vec<Relationship>,
}

/// `PUT /api/model/attributes/{id}/relationships` inside `changeset_id`.
///
/// Replaces the whole relationship list of the attribute and returns the
/// list the server stored (the sent list when the answer has no body).
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn update_attribute_relationships(
    conn: &Connection,
    id: &str,
    relationships: &[Relationship],
    changeset_id: &str,
) -> Result<Vec<Relationship>, SdkError> {
    let request = ApiRequest::put(format!("/api/model/attributes/{id}/relationships"))
        .changeset(Some(changeset_id))
        .json(&RelationshipsBody {
            relationships: relationships.to_vec(),
        })?;
    let stored: Option<RelationshipsBody> = conn.send_json(request).await?;
    Ok(stored.map_or_else(|| relationships.to_vec(), |s| s.relationships))
}
