//! Per-application configuration
//!
//! A [`Config`] owns the five pipelines that drive report dispatch
//! (reporters, data extensions, matchers, rejecters, and filters) plus the
//! application's log location. The pipelines are public so callers can use
//! the full ordered-pipeline API (`insert_after`, `swap`, ...); the
//! singular convenience methods cover the common append case.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::extensions::HostEnvironment;
use crate::matchers;
use crate::pipeline::{Key, Pipeline};
use crate::ports::{DataExtension, Filter, Matcher, Reporter};

/// Where an application writes its own diagnostics.
///
/// Either a fixed path or a function of the application name, so several
/// applications can share one configuration recipe.
#[derive(Clone)]
pub enum LogLocation {
    /// A literal path
    Fixed(PathBuf),
    /// A path computed from the application name
    PerApplication(Arc<dyn Fn(&str) -> PathBuf + Send + Sync>),
}

impl LogLocation {
    /// Resolves the location for the given application name.
    pub fn resolve(&self, application_name: &str) -> PathBuf {
        match self {
            LogLocation::Fixed(path) => path.clone(),
            LogLocation::PerApplication(f) => f(application_name),
        }
    }
}

impl Default for LogLocation {
    fn default() -> Self {
        LogLocation::PerApplication(Arc::new(|name| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flare")
                .join(name)
                .join("flare.log")
        }))
    }
}

impl fmt::Debug for LogLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLocation::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            LogLocation::PerApplication(_) => f.write_str("PerApplication(<fn>)"),
        }
    }
}

/// Configuration for one application (or route).
pub struct Config {
    /// Output sinks, invoked in order on every reported event
    pub reporters: Pipeline<Arc<dyn Reporter>>,
    /// Contributors of additional serialized fields (inheritable by routes)
    pub data_extensions: Pipeline<Arc<dyn DataExtension>>,
    /// Inclusive-OR gating predicates
    pub matchers: Pipeline<Arc<dyn Matcher>>,
    /// Exclusive-ALL gating predicates
    pub rejecters: Pipeline<Arc<dyn Matcher>>,
    /// Event map transforms (inheritable by routes)
    pub filters: Pipeline<Arc<dyn Filter>>,
    log_location: LogLocation,
}

impl Config {
    /// Creates a configuration with empty pipelines, pre-seeded with the
    /// built-in host environment data extension.
    pub fn new() -> Self {
        let mut data_extensions: Pipeline<Arc<dyn DataExtension>> = Pipeline::new();
        data_extensions.add("host_environment", Arc::new(HostEnvironment));

        Config {
            reporters: Pipeline::new(),
            data_extensions,
            matchers: Pipeline::new(),
            rejecters: Pipeline::new(),
            filters: Pipeline::new(),
            log_location: LogLocation::default(),
        }
    }

    /// Appends a reporter.
    pub fn reporter(&mut self, key: impl Into<Key>, reporter: impl Reporter + 'static) {
        self.reporters.add(key, Arc::new(reporter));
    }

    /// Appends a reporter constructed lazily on first dispatch.
    ///
    /// Useful for sinks with heavyweight setup (HTTP clients, open files)
    /// that should not be paid for until an event actually reaches them.
    pub fn reporter_lazy<R, F>(&mut self, key: impl Into<Key>, init: F)
    where
        R: Reporter + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.reporters
            .add_lazy(key, move || Arc::new(init()) as Arc<dyn Reporter>);
    }

    /// Appends a data extension.
    pub fn data_extension(&mut self, key: impl Into<Key>, extension: impl DataExtension + 'static) {
        self.data_extensions.add(key, Arc::new(extension));
    }

    /// Appends a matcher (spelled `match` in pipeline terms; renamed here
    /// because `match` is a keyword).
    pub fn match_when(&mut self, key: impl Into<Key>, matcher: impl Matcher + 'static) {
        self.matchers.add(key, Arc::new(matcher));
    }

    /// Appends a rejecter.
    pub fn reject_when(&mut self, key: impl Into<Key>, matcher: impl Matcher + 'static) {
        self.rejecters.add(key, Arc::new(matcher));
    }

    /// Appends a filter.
    pub fn filter(&mut self, key: impl Into<Key>, filter: impl Filter + 'static) {
        self.filters.add(key, Arc::new(filter));
    }

    /// Resolves a symbolic matcher descriptor (`"class"`, `"backtrace"`,
    /// `"local_request"`, `"multi"`) and appends it as a matcher, keyed by
    /// the descriptor name.
    pub fn match_named(&mut self, name: &str, options: &Value) -> Result<()> {
        let matcher = matchers::resolve(name, options)?;
        self.matchers.add(name, matcher);
        Ok(())
    }

    /// Resolves a symbolic matcher descriptor and appends it as a rejecter.
    pub fn reject_named(&mut self, name: &str, options: &Value) -> Result<()> {
        let matcher = matchers::resolve(name, options)?;
        self.rejecters.add(name, matcher);
        Ok(())
    }

    /// The configured log location.
    pub fn log_location(&self) -> &LogLocation {
        &self.log_location
    }

    /// Sets the log location.
    pub fn set_log_location(&mut self, location: LogLocation) {
        self.log_location = location;
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("reporters", &self.reporters)
            .field("data_extensions", &self.data_extensions)
            .field("matchers", &self.matchers)
            .field("rejecters", &self.rejecters)
            .field("filters", &self.filters)
            .field("log_location", &self.log_location)
            .finish()
    }
}
