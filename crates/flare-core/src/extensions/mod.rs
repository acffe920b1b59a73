//! Built-in data extensions

pub mod host_environment;

pub use host_environment::HostEnvironment;
