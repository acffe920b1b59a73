//! Host environment data extension
//!
//! Contributes static process and runtime information to every event.
//! Seeded into every configuration's `data_extensions` pipeline.

use serde_json::{json, Value};

use crate::event::Event;
use crate::ports::DataExtension;

/// Adds a `host_environment` section with OS, architecture, platform
/// family, and process id.
pub struct HostEnvironment;

impl DataExtension for HostEnvironment {
    fn extend(&self, _event: &Event) -> Option<Value> {
        Some(json!({
            "host_environment": {
                "os": std::env::consts::OS,
                "arch": std::env::consts::ARCH,
                "family": std::env::consts::FAMILY,
                "pid": std::process::id(),
            }
        }))
    }
}
