//! Matcher contract (gating predicate)
//!
//! Matchers decide whether an event proceeds to the reporters. The same
//! contract serves two pipelines with opposite polarity:
//!
//! - **matchers**: when the pipeline is non-empty, at least one matcher
//!   must return `true` for the event to be reported (inclusive OR).
//! - **rejecters**: if any rejecter returns `true`, the event is dropped
//!   (exclusive ALL).

use crate::event::Event;

/// A predicate over a captured event.
pub trait Matcher: Send + Sync {
    /// Whether this matcher considers the event a match.
    fn matches(&self, event: &Event) -> bool;
}

/// Any `Fn(&Event) -> bool` closure is a matcher.
impl<F> Matcher for F
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn matches(&self, event: &Event) -> bool {
        self(event)
    }
}
