//! Per-application diagnostic logging
//!
//! A lightweight logger that appends what the library itself does to the
//! application's configured log location. It exists so users can verify
//! the library is working as intended; it is not a sink for event data,
//! which is the job of reporters.
//!
//! Logging is non-fatal: a location that cannot be created or written is
//! reported through `tracing::warn!` and the log call returns normally.

use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use crate::application::Application;

/// Appends diagnostic lines to an application's log location.
///
/// Obtained through [`Application::logger`], which resolves the location
/// from the current configuration. Each line carries the application name,
/// a one-letter severity, and a UTC timestamp:
///
/// ```text
/// [billing][E][2026-08-23 12:00:00 UTC] -- collector rejected the event
/// ```
pub struct Logger {
    application_name: String,
    location: PathBuf,
}

impl Logger {
    /// Creates a logger for the given application, resolving its log
    /// location from the current configuration.
    pub fn for_application(application: &Application) -> Self {
        let location = application
            .with_config(|config| config.log_location().resolve(application.name()));
        Logger {
            application_name: application.name().to_string(),
            location,
        }
    }

    /// Where this logger writes.
    pub fn location(&self) -> &PathBuf {
        &self.location
    }

    /// Logs an informational line.
    pub fn info(&self, message: impl std::fmt::Display) {
        self.append('I', message);
    }

    /// Logs a warning line.
    pub fn warn(&self, message: impl std::fmt::Display) {
        self.append('W', message);
    }

    /// Logs an error line.
    pub fn error(&self, message: impl std::fmt::Display) {
        self.append('E', message);
    }

    fn append(&self, severity: char, message: impl std::fmt::Display) {
        let line = format!(
            "[{}][{}][{}] -- {}\n",
            self.application_name,
            severity,
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            message
        );
        if let Err(err) = self.write_line(&line) {
            tracing::warn!(
                application = %self.application_name,
                location = %self.location.display(),
                error = %err,
                "failed to write diagnostic log line"
            );
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.location.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.location)?;
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::config::LogLocation;

    #[test]
    fn test_appends_formatted_lines_to_log_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flare.log");

        let app = Application::detached("logged");
        app.configure(|config| {
            config.set_log_location(LogLocation::Fixed(path.clone()));
        });

        let logger = app.logger();
        logger.info("first");
        logger.error("second");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[logged][I]"));
        assert!(lines[0].ends_with("-- first"));
        assert!(lines[1].starts_with("[logged][E]"));
        assert!(lines[1].ends_with("-- second"));
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("flare.log");

        let app = Application::detached("nesting");
        app.configure(|config| {
            config.set_log_location(LogLocation::Fixed(path.clone()));
        });

        app.logger().warn("created on demand");
        assert!(path.is_file());
    }

    #[test]
    fn test_per_application_location_resolves_the_name() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();

        let app = Application::detached("resolved");
        app.configure(move |config| {
            config.set_log_location(LogLocation::PerApplication(std::sync::Arc::new(
                move |name| base.join(name).join("flare.log"),
            )));
        });

        let logger = app.logger();
        assert!(logger.location().ends_with("resolved/flare.log"));
    }

    #[test]
    fn test_unwritable_location_is_non_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the log path makes the open fail.
        let path = dir.path().join("flare.log");
        std::fs::create_dir_all(&path).unwrap();

        let app = Application::detached("unwritable");
        app.configure(|config| {
            config.set_log_location(LogLocation::Fixed(path));
        });

        // Does not panic or return an error.
        app.logger().error("dropped");
    }
}
