//! Flare Reporters - Output sinks for captured events
//!
//! Every reporter implements `flare_core::Reporter` and is meant to be a
//! small unit of functionality; applications compose several of them in
//! their reporter pipeline:
//!
//! - [`FileReporter`] - one JSON file per event, with optional pruning
//! - [`WriterReporter`] - newline-delimited JSON to any stream
//! - [`LogReporter`] - event JSON through `tracing` at a chosen level
//! - [`HttpReporter`] - event JSON POSTed to a remote collector
//!
//! Reporters run inline on the reporting thread and do not retry; a slow
//! or failing sink blocks and aborts the report call it is part of.

pub mod file;
pub mod http;
pub mod log;
pub mod writer;

pub use file::FileReporter;
pub use http::{HttpReporter, HttpReporterOptions};
pub use log::LogReporter;
pub use writer::WriterReporter;
