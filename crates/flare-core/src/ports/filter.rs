//! Filter contract (event map transform)

use serde_json::{Map, Value};

/// A transform applied to the serialized event map after data extensions
/// have been merged.
///
/// Filters run in pipeline order; each receives the previous filter's
/// output and may delete, redact, or add keys. The final filter's output
/// becomes the event's cached hash.
pub trait Filter: Send + Sync {
    /// Transforms the event map, returning the (possibly modified) map.
    fn call(&self, data: Map<String, Value>) -> Map<String, Value>;
}

/// Any `Fn(Map) -> Map` closure is a filter.
impl<F> Filter for F
where
    F: Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync,
{
    fn call(&self, data: Map<String, Value>) -> Map<String, Value> {
        self(data)
    }
}
