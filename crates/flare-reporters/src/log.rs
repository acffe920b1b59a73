//! Log reporter
//!
//! Emits the event JSON through `tracing` at a configurable level, for
//! integrating captured events into an existing logging setup.

use flare_core::{Event, Reporter};
use tracing::Level;

/// Reports events as structured log records under the `flare` target.
pub struct LogReporter {
    level: Level,
}

impl LogReporter {
    /// Creates a reporter emitting at the given level.
    pub fn new(level: Level) -> Self {
        LogReporter { level }
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        LogReporter::new(Level::ERROR)
    }
}

impl Reporter for LogReporter {
    fn report(&self, event: &Event) -> anyhow::Result<()> {
        let json = event.to_json()?;
        let application = event.application().name();

        // tracing levels must be compile-time constants per event site.
        if self.level == Level::ERROR {
            tracing::error!(target: "flare", application, event = %json);
        } else if self.level == Level::WARN {
            tracing::warn!(target: "flare", application, event = %json);
        } else if self.level == Level::INFO {
            tracing::info!(target: "flare", application, event = %json);
        } else if self.level == Level::DEBUG {
            tracing::debug!(target: "flare", application, event = %json);
        } else {
            tracing::trace!(target: "flare", application, event = %json);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_core::{Application, CapturedError};

    #[test]
    fn test_reports_at_every_level_without_error() {
        let app = Application::detached("logging");
        let event = Event::new(app, CapturedError::new("test::Error", "boom"), None);

        for level in [
            Level::ERROR,
            Level::WARN,
            Level::INFO,
            Level::DEBUG,
            Level::TRACE,
        ] {
            LogReporter::new(level).report(&event).unwrap();
        }
    }
}
