//! Stream reporter
//!
//! Dumps each event as one line of JSON to any `Write` stream and flushes
//! immediately. Useful for stderr (often already redirected to a log file),
//! stdout, or a connected socket. For per-event files with unique names,
//! use [`FileReporter`](crate::file::FileReporter) instead.

use std::io::Write;
use std::sync::Mutex;

use anyhow::Context;
use flare_core::{Event, Reporter};

/// Reports events as newline-delimited JSON on a stream.
pub struct WriterReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterReporter {
    /// Wraps an arbitrary stream.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        WriterReporter {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Writes to standard error.
    pub fn stderr() -> Self {
        WriterReporter::new(std::io::stderr())
    }

    /// Writes to standard output.
    pub fn stdout() -> Self {
        WriterReporter::new(std::io::stdout())
    }
}

impl Reporter for WriterReporter {
    fn report(&self, event: &Event) -> anyhow::Result<()> {
        let json = event.to_json()?;
        let mut writer = self.writer.lock().expect("writer reporter lock poisoned");
        writeln!(writer, "{}", json).context("failed to write event")?;
        writer.flush().context("failed to flush event stream")?;
        Ok(())
    }
}
