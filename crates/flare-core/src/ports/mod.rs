//! Pipeline component contracts
//!
//! This module defines the trait interfaces that pipeline components
//! implement:
//! - [`Matcher`] - gating predicates (also used as rejecters)
//! - [`Filter`] - post-processing transforms over the serialized event map
//! - [`DataExtension`] - contributors of additional serialized fields
//! - [`Reporter`] - output sinks receiving finished events
//! - [`Integrator`] - hooks wiring an application into a host framework
//!
//! Every contract except [`Integrator`] has a blanket implementation for
//! plain closures, so ad-hoc inline configuration never requires a named
//! type.

pub mod data_extension;
pub mod filter;
pub mod integrator;
pub mod matcher;
pub mod reporter;

pub use data_extension::DataExtension;
pub use filter::Filter;
pub use integrator::Integrator;
pub use matcher::Matcher;
pub use reporter::Reporter;
