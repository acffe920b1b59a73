//! File reporter
//!
//! Writes each event as a JSON file named
//! `<epoch seconds>-<uniqueness hash>.json` inside a configurable output
//! directory. The directory can be fixed or computed per event (the default
//! keys it by application name), and files older than an optional maximum
//! age are pruned before each write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use flare_core::{Event, Reporter};

/// Where event files are written.
#[derive(Clone)]
pub enum OutputDirectory {
    /// A literal directory
    Fixed(PathBuf),
    /// A directory computed from the event
    PerEvent(Arc<dyn Fn(&Event) -> PathBuf + Send + Sync>),
}

impl Default for OutputDirectory {
    fn default() -> Self {
        OutputDirectory::PerEvent(Arc::new(|event| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flare")
                .join("errors")
                .join(event.application().name())
        }))
    }
}

/// Reports events by writing their JSON to the local filesystem.
#[derive(Default)]
pub struct FileReporter {
    output_directory: OutputDirectory,
    prune_max_age: Option<Duration>,
}

impl FileReporter {
    /// Creates a reporter writing under the default per-application
    /// directory, with pruning disabled.
    pub fn new() -> Self {
        FileReporter::default()
    }

    /// Writes into a fixed directory.
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = OutputDirectory::Fixed(directory.into());
        self
    }

    /// Computes the directory from each event.
    pub fn with_output_directory_fn(
        mut self,
        f: impl Fn(&Event) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        self.output_directory = OutputDirectory::PerEvent(Arc::new(f));
        self
    }

    /// Deletes previously written files older than `max_age` before each
    /// write.
    pub fn with_prune_max_age(mut self, max_age: Duration) -> Self {
        self.prune_max_age = Some(max_age);
        self
    }

    fn directory_for(&self, event: &Event) -> PathBuf {
        match &self.output_directory {
            OutputDirectory::Fixed(path) => path.clone(),
            OutputDirectory::PerEvent(f) => f(event),
        }
    }

    fn prune(&self, directory: &Path, max_age: Duration) -> anyhow::Result<()> {
        let entries = std::fs::read_dir(directory)
            .with_context(|| format!("failed to list {}", directory.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            let age = modified.elapsed().unwrap_or_default();
            if age >= max_age {
                if let Err(err) = std::fs::remove_file(&path) {
                    tracing::warn!(file = %path.display(), error = %err, "failed to prune event file");
                }
            }
        }
        Ok(())
    }
}

impl Reporter for FileReporter {
    fn report(&self, event: &Event) -> anyhow::Result<()> {
        let directory = self.directory_for(event);
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;

        if let Some(max_age) = self.prune_max_age {
            self.prune(&directory, max_age)?;
        }

        let filename = format!(
            "{}-{}.json",
            event.occurred_at().timestamp(),
            event.uniqueness_hash()
        );
        let path = directory.join(filename);
        std::fs::write(&path, event.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
