//! Recursive map merging
//!
//! Data-extension contributions are combined into the event map with a
//! deep merge: nested objects are merged key by key, while any non-object
//! value at a given key is overwritten by the later source.

use serde_json::{Map, Value};

/// Deep-merges `source` into `target`.
///
/// When both sides hold an object at the same key the objects are merged
/// recursively; otherwise the source value replaces the target value.
pub fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            if let Value::Object(incoming) = value {
                deep_merge(existing, incoming);
                continue;
            }
        }
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_nested_objects_merge_key_by_key() {
        let mut target = obj(json!({"a": {"a": 1}}));
        deep_merge(&mut target, obj(json!({"a": {"b": 2}})));
        assert_eq!(Value::Object(target), json!({"a": {"a": 1, "b": 2}}));
    }

    #[test]
    fn test_non_object_values_are_overwritten() {
        let mut target = obj(json!({"a": {"a": 1}, "b": 1}));
        deep_merge(&mut target, obj(json!({"a": 2, "b": {"c": 3}})));
        assert_eq!(Value::Object(target), json!({"a": 2, "b": {"c": 3}}));
    }

    #[test]
    fn test_empty_source_is_a_no_op() {
        let mut target = obj(json!({"a": 1}));
        deep_merge(&mut target, Map::new());
        assert_eq!(Value::Object(target), json!({"a": 1}));
    }

    #[test]
    fn test_merge_three_levels_deep() {
        let mut target = obj(json!({"a": {"b": {"c": 1}}}));
        deep_merge(&mut target, obj(json!({"a": {"b": {"d": 2}, "e": 3}})));
        assert_eq!(
            Value::Object(target),
            json!({"a": {"b": {"c": 1, "d": 2}, "e": 3}})
        );
    }
}
