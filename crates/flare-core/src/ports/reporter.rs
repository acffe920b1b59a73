//! Reporter contract (output sink)
//!
//! A reporter takes a finished event and "reports" it somewhere: a file, a
//! stream, a log, a remote collector. Reporters are meant to be small units
//! of functionality; an application composes several of them in a pipeline.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because failure modes are sink-specific
//!   (I/O errors, HTTP status codes, serialization).
//! - The core does not catch reporter errors: the first failure aborts the
//!   remaining reporters and routes of the same `report` call and
//!   propagates to the caller.
//! - Reporters run inline and block the caller; timeouts are a reporter's
//!   own responsibility.

use crate::event::Event;

/// An output sink for captured events.
pub trait Reporter: Send + Sync {
    /// Reports the event.
    ///
    /// Implementations typically call [`Event::to_hash`] or
    /// [`Event::to_json`], which triggers (memoized) hash assembly.
    fn report(&self, event: &Event) -> anyhow::Result<()>;
}

/// Any `Fn(&Event) -> anyhow::Result<()>` closure is a reporter.
impl<F> Reporter for F
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    fn report(&self, event: &Event) -> anyhow::Result<()> {
        self(event)
    }
}
