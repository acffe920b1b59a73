//! Built-in matchers and the symbolic descriptor registry
//!
//! Matchers can be constructed directly and handed to
//! [`Config::match_when`](crate::config::Config::match_when), or resolved
//! by symbolic name plus JSON options through [`resolve`]. Resolution goes
//! through an explicit registry populated once with the built-in variants;
//! no name-convention reflection.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::ports::Matcher;

pub mod backtrace;
pub mod class;
pub mod local_request;
pub mod multi;

pub use backtrace::BacktraceMatcher;
pub use class::ClassMatcher;
pub use local_request::LocalRequestMatcher;
pub use multi::MultiMatcher;

/// Constructs a matcher from JSON options.
pub type MatcherFactory = fn(&Value) -> Result<Arc<dyn Matcher>>;

fn registry() -> &'static HashMap<&'static str, MatcherFactory> {
    static REGISTRY: OnceLock<HashMap<&'static str, MatcherFactory>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<&'static str, MatcherFactory> = HashMap::new();
        class::register(&mut map);
        backtrace::register(&mut map);
        local_request::register(&mut map);
        multi::register(&mut map);
        map
    })
}

/// Resolves a symbolic matcher descriptor.
///
/// Fails with [`Error::UnknownDescriptor`] for unregistered names and
/// [`Error::InvalidDescriptorOptions`] when the options do not fit the
/// named matcher.
pub fn resolve(name: &str, options: &Value) -> Result<Arc<dyn Matcher>> {
    let factory = registry().get(name).ok_or_else(|| Error::UnknownDescriptor {
        name: name.to_string(),
    })?;
    factory(options)
}

/// The registered descriptor names, sorted.
pub fn descriptors() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = registry().keys().copied().collect();
    names.sort_unstable();
    names
}

pub(crate) fn invalid_options(name: &'static str, source: impl Into<anyhow::Error>) -> Error {
    Error::InvalidDescriptorOptions {
        name: name.to_string(),
        source: source.into(),
    }
}
