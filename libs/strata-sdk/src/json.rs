//! JSON payload helpers.

use serde::Serialize;
use serde_json::Value;

use crate::error::SdkError;

/// Recursively drop object entries whose value is `null`.
///
/// Array elements are kept (a `null` inside a list is positional) but
/// objects nested in arrays are pruned too.
#[must_use]
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

/// Serialize `value` and prune nulls, producing a request body.
///
/// # Errors
/// Returns `SdkError::Json` if serialization fails.
pub fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<Value, SdkError> {
    Ok(prune_nulls(serde_json::to_value(value)?))
}
