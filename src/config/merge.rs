//! Deep merge for style and configuration mappings.
//!
//! Merging `source` into `target`:
//! - keys only in `source` are copied
//! - nested mappings are merged recursively
//! - sequences are unioned: `source` items not already present are appended
//! - anything else (scalars, mismatched types) is replaced by `source`
//!
//! The "already present" check is a truthiness check, so a falsy value in
//! `target` (`null`, `false`, `0`, `""`, `[]`, `{}`) is overwritten outright.
//! Merge order encodes precedence; the operation is not commutative.

use serde_json::{Map, Value};

/// A style or configuration mapping. Keys keep their source order.
pub type Mapping = Map<String, Value>;

/// Whether a value counts as "set" for merging purposes.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Merge `source` into `target`. `source` is cloned, never aliased.
///
/// # Example
/// ```
/// use serde_json::json;
/// use pandoc_styles::config::{Mapping, merge_into};
///
/// let mut target: Mapping = serde_json::from_value(json!({"k": ["a", "b"], "x": 1})).unwrap();
/// let source: Mapping = serde_json::from_value(json!({"k": ["b", "c"], "x": 2})).unwrap();
/// merge_into(&mut target, &source);
/// assert_eq!(serde_json::Value::Object(target), json!({"k": ["a", "b", "c"], "x": 2}));
/// ```
pub fn merge_into(target: &mut Mapping, source: &Mapping) {
    for (key, value) in source {
        match target.get_mut(key) {
            Some(existing) if is_truthy(existing) => merge_value(existing, value),
            Some(existing) => *existing = value.clone(),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge an incoming value into an existing, truthy one.
fn merge_value(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(existing_map), Value::Object(incoming_map)) => {
            merge_into(existing_map, incoming_map);
        }
        (Value::Array(existing_items), Value::Array(incoming_items)) => {
            for item in incoming_items {
                if !existing_items.contains(item) {
                    existing_items.push(item.clone());
                }
            }
        }
        (existing, incoming) => *existing = incoming.clone(),
    }
}

/// Merge a list of mappings in order, later mappings taking precedence.
pub fn merge_all<'a>(mappings: impl IntoIterator<Item = &'a Mapping>) -> Mapping {
    let mut merged = Mapping::new();
    for mapping in mappings {
        merge_into(&mut merged, mapping);
    }
    merged
}

/// View a value as a mapping, treating anything else as empty.
pub fn as_mapping(value: Option<&Value>) -> Option<&Mapping> {
    value.and_then(Value::as_object)
}
