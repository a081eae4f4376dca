//! Canonical JSON serialization.
//!
//! Manifest signatures cover the canonical serialization of the manifest
//! object: compact encoding with object keys recursively sorted. Signer and
//! verifier must byte-agree on this form, so the key ordering is enforced
//! here rather than left to map iteration order.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::CoreResult;

/// Serialize a JSON value into its canonical byte form.
///
/// Object keys are sorted recursively; arrays keep their order. The output
/// is compact (no insignificant whitespace).
pub fn to_canonical_vec(value: &Value) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(&sort_keys(value))?)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(key, item)| (key.clone(), sort_keys(item)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
