//! JSON envelope decoding
//!
//! Every REST payload wraps its resource under a field named after the
//! resource. These helpers are pure so the envelope rules can be tested
//! without a network.

use crate::error::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract and decode the entity under `field`. A present envelope with
/// the field missing is a decode error: absence is signalled by HTTP
/// status, not by payload shape.
pub(crate) fn unwrap_entity<T: DeserializeOwned>(mut envelope: Value, field: &str) -> ClientResult<T> {
    let inner = envelope
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ClientError::decode(format!("response envelope is missing {field:?}")))?;
    serde_json::from_value(inner)
        .map_err(|e| ClientError::decode(format!("invalid {field} payload: {e}")))
}

/// Extract and decode the collection under `field`, defaulting to an empty
/// sequence when the field is missing or null.
pub(crate) fn unwrap_list<T: DeserializeOwned>(
    mut envelope: Value,
    field: &str,
) -> ClientResult<Vec<T>> {
    match envelope.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(inner) => serde_json::from_value(inner)
            .map_err(|e| ClientError::decode(format!("invalid {field} list payload: {e}"))),
    }
}

/// Read `<field>.amount` as a decimal string, `"0"` when absent.
pub(crate) fn amount_or_zero(envelope: &Value, field: &str) -> String {
    match envelope.get(field).and_then(|coin| coin.get("amount")) {
        Some(Value::String(amount)) => amount.clone(),
        Some(Value::Number(amount)) => amount.to_string(),
        _ => "0".to_string(),
    }
}
