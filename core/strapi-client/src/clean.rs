//! Cleanup of raw API entities.
//!
//! Strapi (on MongoDB) returns `_id` and `__v`, and may return other
//! double-underscore keys that the content graph reserves for itself.

use serde_json::{Map, Value};

/// Cleans one entity:
///
/// - `__v` is dropped
/// - `_id` becomes `id`
/// - `__<name>` becomes `strapi_<name>`
/// - other object and array values are cleaned recursively
///
/// Renamed values are kept as they are.
pub fn clean(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(clean_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(clean).collect()),
        other => other,
    }
}

fn clean_object(map: Map<String, Value>) -> Map<String, Value> {
    let mut cleaned = Map::with_capacity(map.len());
    for (key, value) in map {
        if key == "__v" {
            continue;
        }
        if key == "_id" {
            cleaned.insert("id".to_string(), value);
        } else if let Some(name) = key.strip_prefix("__") {
            cleaned.insert(format!("strapi_{name}"), value);
        } else {
            cleaned.insert(key, clean(value));
        }
    }
    cleaned
}

/// Coerces a response body into a list: arrays are kept, anything else
/// becomes a single-element list.
pub fn cast_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
