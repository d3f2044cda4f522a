//! Value helpers shared by the resolvers.

use serde_json::{Map, Value};

/// A flat option map. Insertion order is preserved, so an overwritten key
/// keeps the position it was first seen at.
pub type ConfigMap = Map<String, Value>;

/// Whether a value counts as "nothing" for a section identifier.
///
/// Falsy values are `null`, `false`, numeric zero, the empty string, the
/// empty array and the empty object. Everything else is truthy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Shallow update: every key of `overlay` overwrites the same key in `acc`.
///
/// Nested objects are replaced wholesale, never merged field by field.
pub fn shallow_update(acc: &mut ConfigMap, overlay: &ConfigMap) {
    for (key, value) in overlay {
        acc.insert(key.clone(), value.clone());
    }
}
