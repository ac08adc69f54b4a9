//! Canonical byte encoding for stored records.
//!
//! Every logical value has exactly one encoding: compact JSON, object keys in
//! sorted order, UTF-8 text. Content addressing depends on this property, so
//! two records with equal fields always hash to the same [`ObjectId`].
//!
//! [`ObjectId`]: crate::ObjectId

use crate::error::{GpError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encodes `value` into canonical bytes.
///
/// The value is first converted into a [`Value`] tree, whose objects are
/// backed by a sorted map, then written without whitespace.
///
/// # Errors
///
/// Returns `GpError::Format` when the value has no JSON representation,
/// e.g. a map with non-string keys. Non-finite floats have no number form
/// and encode as `null`.
///
/// # Examples
///
/// ```
/// use graphpaper_core::canonical;
/// use serde_json::json;
///
/// let bytes = canonical::encode(&json!({"x": 34, "objtype": "card"})).unwrap();
/// assert_eq!(bytes, br#"{"objtype":"card","x":34}"#);
/// ```
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let tree = serde_json::to_value(value).map_err(|e| GpError::Format(e.to_string()))?;
    serde_json::to_vec(&tree).map_err(|e| GpError::Format(e.to_string()))
}

/// Decodes canonical bytes into a [`Value`].
///
/// # Errors
///
/// Returns `GpError::Format` if the bytes are not valid UTF-8 JSON.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| GpError::Format(e.to_string()))
}

/// Decodes canonical bytes straight into a typed value.
pub fn decode_as<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_value(decode(bytes)?).map_err(|e| GpError::Format(e.to_string()))
}

/// Returns true if `bytes` are exactly the canonical encoding of what they decode to.
pub fn is_canonical(bytes: &[u8]) -> bool {
    match decode(bytes) {
        Ok(value) => encode(&value).map(|b| b == bytes).unwrap_or(false),
        Err(_) => false,
    }
}
