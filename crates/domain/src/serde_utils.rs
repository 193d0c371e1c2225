//! Lenient field decoders for identity service payloads

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an optional identifier that the service may send as a JSON string
/// or a JSON number. `null` and absent both map to `None`.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => {
            Err(serde::de::Error::custom(format!("expected string or number, got {other}")))
        }
    }
}
