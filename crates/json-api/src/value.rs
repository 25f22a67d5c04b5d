//! Value helpers shared across the document machinery.

use serde_json::Value;

/// An insertion-ordered JSON object map.
pub type JsonMap = serde_json::Map<String, Value>;

/// Recursively overlay `overlay` onto `base`.
///
/// Objects merge key-wise and arrays merge index-wise; everywhere else the
/// overlay value wins. Extra array elements in the overlay are appended.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) => {
            for (index, value) in overlay.into_iter().enumerate() {
                if index < base.len() {
                    deep_merge(&mut base[index], value);
                } else {
                    base.push(value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// [`deep_merge`] at the object-map level.
pub fn deep_merge_map(base: &mut JsonMap, overlay: JsonMap) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// The string form of a scalar value: `json!(42)` becomes `"42"`,
/// `json!("42")` stays `"42"`. Null becomes the empty string.
pub fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a value counts as "no data": null, the empty string, or an
/// empty object or array. Numbers and booleans always carry data.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Number(_) | Value::Bool(_) => false,
    }
}
