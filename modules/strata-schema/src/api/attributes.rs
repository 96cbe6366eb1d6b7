use crate::expression::ExpressionFormat;
use serde_json::Value;
use strata_sdk::{ApiRequest, Connection, SdkError};

const ATTRIBUTES_PATH: &str = "/api/model/attributes";

fn attribute_path(id: &str) -> String {
    format!("{ATTRIBUTES_PATH}/{id}")
}

/// `GET /api/model/attributes/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn get_attribute(
    conn: &Connection,
    id: &str,
    show_expression_as: ExpressionFormat,
) -> Result<Value, SdkError> {
    let request =
        ApiRequest::get(attribute_path(id)).query("showExpressionAs", show_expression_as);
    conn.send_json(request).await
}

/// `POST /api/model/attributes` inside `changeset_id`.
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn create_attribute(
    conn: &Connection,
    body: Value,
    show_expression_as: ExpressionFormat,
    changeset_id: &str,
) -> Result<Value, SdkError> {
    let request = ApiRequest::post(ATTRIBUTES_PATH)
        .query("showExpressionAs", show_expression_as)
        .changeset(Some(changeset_id))
        .json_value(body);
    conn.send_json(request).await
}

/// `PATCH /api/model/attributes/{id}` inside `changeset_id`.
///
/// Only the keys present in `body` are changed.
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn update_attribute(
    conn: &Connection,
    id: &str,
    body: Value,
    show_expression_as: ExpressionFormat,
    changeset_id: &str,
) -> Result<Value, SdkError> {
    let request = ApiRequest::patch(attribute_path(id))
        .query("showExpressionAs", show_expression_as)
        .changeset(Some(changeset_id))
        .json_value(body);
    conn.send_json(request).await
}
