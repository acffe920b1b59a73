//! Data extension contract (serialized field contributor)

use serde_json::Value;

use crate::event::Event;

/// A contributor of additional fields to an event's serialized map.
///
/// Extensions run before filters, in pipeline order (an application's own
/// extensions first, then its ancestors'). Each contribution is deep-merged
/// into the event map; returning `None` contributes nothing.
pub trait DataExtension: Send + Sync {
    /// Computes this extension's contribution for the given event.
    ///
    /// The returned value should be a JSON object; non-object values
    /// are ignored by the merge.
    fn extend(&self, event: &Event) -> Option<Value>;
}

/// Any `Fn(&Event) -> Option<Value>` closure is a data extension.
impl<F> DataExtension for F
where
    F: Fn(&Event) -> Option<Value> + Send + Sync,
{
    fn extend(&self, event: &Event) -> Option<Value> {
        self(event)
    }
}
