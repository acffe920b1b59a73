//! Flare Core - In-process exception capture and routing
//!
//! This crate contains the capture and dispatch pipeline:
//! - **Applications** - named reporting contexts with nested routes
//!   (`Application`, `Registry`)
//! - **Pipelines** - ordered, keyed component sequences (`Pipeline`,
//!   `LazyValue`)
//! - **Events** - lazily serialized error occurrences (`Event`,
//!   `CapturedError`, `Backtrace`)
//! - **Contracts** - traits for matchers, rejecters, filters, data
//!   extensions, reporters, and integrators (`ports`)
//! - **Built-ins** - class/backtrace/local-request/multi matchers, key
//!   redaction filter, host environment extension
//!
//! # Architecture
//!
//! An application owns a [`Config`] holding five pipelines. On
//! [`Application::report`] an [`Event`] is built, rejecters gate it (any
//! match drops it), matchers gate it (one must match when any are
//! configured), then every reporter receives it in pipeline order, and the
//! report recurses into child routes. Reporters serialize through
//! [`Event::to_hash`], which deep-merges data-extension contributions and
//! applies filters exactly once, caching the result.
//!
//! ```
//! use flare_core::{Application, CapturedError, Event};
//!
//! let app = Application::detached("demo");
//! app.configure(|config| {
//!     config.reporter("stderr", |event: &Event| {
//!         eprintln!("{}", event.to_json()?);
//!         Ok(())
//!     });
//! });
//!
//! let error = CapturedError::new("demo::Error", "it broke");
//! app.report(&error, None).unwrap();
//! ```

pub mod application;
pub mod backtrace;
pub mod config;
pub mod error;
pub mod event;
pub mod extensions;
pub mod filters;
pub mod logger;
pub mod matchers;
pub mod merge;
pub mod pipeline;
pub mod ports;
pub mod registry;

pub use application::{Application, ReportOutcome};
pub use config::{Config, LogLocation};
pub use error::{Error, Result};
pub use event::{CapturedError, Event};
pub use logger::Logger;
pub use pipeline::{Key, LazyValue, Pipeline, PipelineRef};
pub use ports::{DataExtension, Filter, Integrator, Matcher, Reporter};
pub use registry::Registry;
