//! Core error types
//!
//! This module defines the error taxonomy for the capture and routing
//! pipeline: registration conflicts, invalid pipeline references,
//! unresolvable descriptors, and propagated reporter failures.

use thiserror::Error;

/// Errors that can occur while configuring or dispatching reports
#[derive(Debug, Error)]
pub enum Error {
    /// An application with this name is already registered
    #[error("application '{name}' already exists (registered at {existing_location})")]
    ApplicationAlreadyExists {
        /// The conflicting application name
        name: String,
        /// Where the existing application was created
        existing_location: String,
    },

    /// A pipeline operation referenced a key that is not present
    #[error("no pipeline entry with key '{key}'")]
    UnknownKey {
        /// The key that could not be resolved
        key: String,
    },

    /// A symbolic descriptor did not resolve to a registered factory
    #[error("unknown descriptor '{name}'")]
    UnknownDescriptor {
        /// The descriptor that could not be resolved
        name: String,
    },

    /// Options supplied for a symbolic descriptor were rejected
    #[error("invalid options for descriptor '{name}': {source}")]
    InvalidDescriptorOptions {
        /// The descriptor whose options were rejected
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A required configuration option was not provided
    #[error("{subject} requires the `{option}` option")]
    MissingOption {
        /// The component missing its option
        subject: String,
        /// The name of the missing option
        option: String,
    },

    /// A reporter failed while handling an event
    ///
    /// Reporter failures are not swallowed by the core: the first failing
    /// reporter aborts the remaining reporters and routes of the same
    /// `report` call, and the error propagates to the caller.
    #[error("reporter '{key}' failed: {source}")]
    Reporter {
        /// The pipeline key of the failing reporter
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Event serialization failed
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the core
pub type Result<T> = std::result::Result<T, Error>;
