use serde::Deserialize;
use serde_json::Value;
use strata_sdk::{ApiRequest, Connection, SdkError};

const SUBSCRIPTIONS_PATH: &str = "/api/subscriptions";

fn subscription_path(id: &str) -> String {
    format!("{SUBSCRIPTIONS_PATH}/{id}")
}

/// One page of `GET /api/subscriptions`.
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn list_subscriptions(
    conn: &Connection,
    offset: usize,
    limit: usize,
    last_run: bool,
) -> Result<Vec<Value>, SdkError> {
    #[derive(Deserialize)]
    struct Page {
        #[serde(default)]
        subscriptions: Vec<Value>,
    }
    let request = ApiRequest::get(SUBSCRIPTIONS_PATH)
        .query("offset", offset)
        .query("limit", limit)
        .query("lastRun", last_run);
    let page: Page = conn.send_json(request).await?;
    Ok(page.subscriptions)
}

/// `GET /api/subscriptions/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn get_subscription(conn: &Connection, id: &str) -> Result<Value, SdkError> {
    conn.send_json(ApiRequest::get(subscription_path(id))).await
}

/// `POST /api/subscriptions`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn create_subscription(conn: &Connection, body: Value) -> Result<Value, SdkError> {
    conn.send_json(ApiRequest::post(SUBSCRIPTIONS_PATH).json_value(body))
        .await
}

/// `PUT /api/subscriptions/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn update_subscription(
    conn: &Connection,
    id: &str,
    body: Value,
) -> Result<Value, SdkError> {
    conn.send_json(ApiRequest::put(subscription_path(id)).json_value(body))
        .await
}

/// `DELETE /api/subscriptions/{id}`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn remove_subscription(conn: &Connection, id: &str) -> Result<(), SdkError> {
    conn.send(ApiRequest::delete(subscription_path(id))).await?;
    Ok(())
}

/// `POST /api/subscriptions/{id}/send`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn send_subscription(conn: &Connection, id: &str) -> Result<(), SdkError> {
    conn.send(ApiRequest::post(format!("{}/send", subscription_path(id))))
        .await?;
    Ok(())
}

/// `GET /api/subscriptions/bursting`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn bursting_attributes(
    conn: &Connection,
    content_id: &str,
    content_type: &str,
) -> Result<Value, SdkError> {
    let request = ApiRequest::get(format!("{SUBSCRIPTIONS_PATH}/bursting"))
        .query("contentId", content_id)
        .query("contentType", content_type);
    conn.send_json(request).await
}

/// `POST /api/subscriptions/recipients/results`
///
/// # Errors
/// Returns `SdkError::Api` for server errors.
pub async fn available_recipients(
    conn: &Connection,
    body: Value,
    delivery_type: &str,
) -> Result<Value, SdkError> {
    let request = ApiRequest::post(format!("{SUBSCRIPTIONS_PATH}/recipients/results"))
        .query("deliveryType", delivery_type)
        .json_value(body);
    conn.send_json(request).await
}
