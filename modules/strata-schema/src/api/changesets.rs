//! Modeling changesets.
//!
//! Schema writes are staged in a changeset and become visible once it is
//! committed.

use crate::error::SchemaError;
use serde::Deserialize;
use strata_sdk::{ApiRequest, Connection, SdkError};

const CHANGESETS_PATH: &str = "/api/model/changesets";

#[derive(Debug, Deserialize)]
struct ChangesetCreated {
    id: String,
}

/// `POST /api/model/changesets`, returning the new changeset id.
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn create_changeset(conn: &Connection, schema_edit: bool) -> Result<String, SdkError> {
    let request = ApiRequest::post(CHANGESETS_PATH).query("schemaEdit", schema_edit);
    let created: ChangesetCreated = conn.send_json(request).await?;
    Ok(created.id)
}

/// `POST /api/model/changesets/{id}/commit`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn commit_changeset(conn: &Connection, id: &str) -> Result<(), SdkError> {
    conn.send(ApiRequest::post(format!("{CHANGESETS_PATH}/{id}/commit")))
        .await?;
    Ok(())
}

/// `DELETE /api/model/changesets/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn delete_changeset(conn: &Connection, id: &str) -> Result<(), SdkError> {
    conn.send(ApiRequest::delete(format!("{CHANGESETS_PATH}/{id}")))
        .await?;
    Ok(())
}

/// An open changeset owned by the SDK.
///
/// Must be finished with [`commit`](Self::commit),
/// [`discard`](Self::discard) or [`finish`](Self::finish).
#[derive(Debug)]
#[must_use = "an open changeset must be committed or discarded"]
pub struct Changeset {
    id: String,
}

impl Changeset {
    /// # Errors
    /// Returns `SdkError::Api` for server errors.
    pub async fn open(conn: &Connection) -> Result<Self, SdkError> {
        let id = create_changeset(conn, true).await?;
        tracing::debug!(changeset_id = %id, "opened changeset");
        Ok(Self { id })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// # Errors
    /// Returns `SdkError::Api` for server errors.
    pub async fn commit(self, conn: &Connection) -> Result<(), SdkError> {
        commit_changeset(conn, &self.id).await?;
        tracing::debug!(changeset_id = %self.id, "committed changeset");
        Ok(())
    }

    /// # Errors
    /// Returns `SdkError::Api` for server errors.
    pub async fn discard(self, conn: &Connection) -> Result<(), SdkError> {
        delete_changeset(conn, &self.id).await
    }

    /// Commit on `Ok`, discard on `Err`, and pass `result` through.
    ///
    /// A failed discard is logged; the original error is returned.
    ///
    /// # Errors
    /// Returns the error in `result`, or the commit failure.
    pub async fn finish<T>(
        self,
        conn: &Connection,
        result: Result<T, SchemaError>,
    ) -> Result<T, SchemaError> {
        match result {
            Ok(value) => {
                self.commit(conn).await?;
                Ok(value)
            }
            Err(err) => {
                let id = self.id.clone();
                if let Err(discard_err) = self.discard(conn).await {
                    tracing::warn!(changeset_id = %id, error = %discard_err, "failed to discard changeset");
                }
                Err(err)
            }
        }
    }
}
