//! Key redaction filter
//!
//! Replaces the value of configured keys anywhere in the event map with a
//! fixed token, recursing into nested objects. Given:
//!
//! ```text
//! { "request":  { "password": "foo" },
//!   "rack_env": { "params": { "password": "foo" } } }
//! ```
//!
//! filtering on `password` yields:
//!
//! ```text
//! { "request":  { "password": "[FILTERED]" },
//!   "rack_env": { "params": { "password": "[FILTERED]" } } }
//! ```

use serde_json::{Map, Value};

use crate::ports::Filter;

/// The default replacement token.
pub const FILTERED: &str = "[FILTERED]";

/// Redacts configured keys from the event map, at any nesting depth.
pub struct KeyFilter {
    keys: Vec<String>,
    replacement: String,
}

impl KeyFilter {
    /// Creates a filter redacting the given keys with [`FILTERED`].
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyFilter {
            keys: keys.into_iter().map(Into::into).collect(),
            replacement: FILTERED.to_string(),
        }
    }

    /// Overrides the replacement token.
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    fn redact(&self, data: &mut Map<String, Value>) {
        for (key, value) in data.iter_mut() {
            if self.keys.iter().any(|k| k == key) {
                *value = Value::String(self.replacement.clone());
            } else if let Value::Object(nested) = value {
                self.redact(nested);
            }
        }
    }
}

impl Filter for KeyFilter {
    fn call(&self, mut data: Map<String, Value>) -> Map<String, Value> {
        self.redact(&mut data);
        data
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
    fn test_redacts_key_at_every_depth() {
        let filter = KeyFilter::new(["password"]);
        let data = obj(json!({
            "request": {"password": "x", "path": "/login"},
            "nested": {"deeper": {"password": "y"}},
            "password": "z"
        }));

        let filtered = filter.call(data);
        assert_eq!(
            Value::Object(filtered),
            json!({
                "request": {"password": "[FILTERED]", "path": "/login"},
                "nested": {"deeper": {"password": "[FILTERED]"}},
                "password": "[FILTERED]"
            })
        );
    }

    #[test]
    fn test_multiple_keys_and_custom_replacement() {
        let filter = KeyFilter::new(["password", "token"]).with_replacement("<gone>");
        let data = obj(json!({"password": "a", "token": "b", "user": "c"}));

        let filtered = filter.call(data);
        assert_eq!(
            Value::Object(filtered),
            json!({"password": "<gone>", "token": "<gone>", "user": "c"})
        );
    }

    #[test]
    fn test_redacted_subtree_is_replaced_wholesale() {
        let filter = KeyFilter::new(["params"]);
        let data = obj(json!({"params": {"a": 1, "b": 2}}));
        let filtered = filter.call(data);
        assert_eq!(Value::Object(filtered), json!({"params": "[FILTERED]"}));
    }

    #[test]
    fn test_untouched_when_no_key_matches() {
        let filter = KeyFilter::new(["password"]);
        let data = obj(json!({"user": {"name": "ada"}}));
        let filtered = filter.call(data.clone());
        assert_eq!(filtered, data);
    }
}
