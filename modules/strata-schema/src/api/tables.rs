use serde_json::Value;
use strata_sdk::{ApiRequest, Connection, SdkError};

/// `GET /api/model/tables/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn get_table(conn: &Connection, id: &str) -> Result<Value, SdkError> {
    conn.send_json(ApiRequest::get(format!("/api/model/tables/{id}")))
        .await
}
