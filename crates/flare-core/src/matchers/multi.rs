//! Composite AND matcher
//!
//! Application matchers combine as an inclusive OR: any match reports the
//! event. [`MultiMatcher`] expresses an AND instead: it owns a nested
//! [`Config`] and matches only when ALL nested matchers match and ALL
//! nested rejecters do not.
//!
//! ```
//! use flare_core::matchers::{BacktraceMatcher, ClassMatcher, MultiMatcher};
//!
//! let both = MultiMatcher::new(|config| {
//!     config.match_when("class", ClassMatcher::exact("billing::ChargeError"));
//!     config.match_when("backtrace", BacktraceMatcher::containing("lib/billing"));
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::{invalid_options, MatcherFactory};
use crate::config::Config;
use crate::error::Result;
use crate::event::Event;
use crate::ports::Matcher;

/// Matches only when every nested matcher matches and every nested
/// rejecter does not.
pub struct MultiMatcher {
    config: Config,
}

impl MultiMatcher {
    /// Creates a composite matcher, configuring its nested matchers and
    /// rejecters through the given closure.
    pub fn new(configure: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::new();
        configure(&mut config);
        MultiMatcher { config }
    }
}

impl Matcher for MultiMatcher {
    fn matches(&self, event: &Event) -> bool {
        let all_match = self
            .config
            .matchers
            .values()
            .iter()
            .all(|matcher| matcher.matches(event));
        if !all_match {
            return false;
        }

        self.config
            .rejecters
            .values()
            .iter()
            .all(|rejecter| !rejecter.matches(event))
    }
}

#[derive(Deserialize)]
struct DescriptorSpec {
    name: String,
    #[serde(default)]
    options: Value,
}

#[derive(Deserialize)]
struct Options {
    #[serde(default)]
    matchers: Vec<DescriptorSpec>,
    #[serde(default)]
    rejecters: Vec<DescriptorSpec>,
}

pub(crate) fn register(map: &mut HashMap<&'static str, MatcherFactory>) {
    map.insert("multi", from_options);
}

fn from_options(options: &Value) -> Result<Arc<dyn Matcher>> {
    let options: Options =
        serde_json::from_value(options.clone()).map_err(|e| invalid_options("multi", e))?;

    let mut config = Config::new();
    for spec in options.matchers {
        let matcher = super::resolve(&spec.name, &spec.options)?;
        config.matchers.add(spec.name.as_str(), matcher);
    }
    for spec in options.rejecters {
        let matcher = super::resolve(&spec.name, &spec.options)?;
        config.rejecters.add(spec.name.as_str(), matcher);
    }

    Ok(Arc::new(MultiMatcher { config }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::event::CapturedError;
    use crate::matchers::{BacktraceMatcher, ClassMatcher};
    use serde_json::json;

    fn event(klass: &str, trace: Vec<&str>) -> Event {
        let app = Application::detached("multi-matcher");
        let error = CapturedError::new(klass, "boom").with_backtrace(trace);
        Event::new(app, error, None)
    }

    #[test]
    fn test_requires_all_matchers() {
        let matcher = MultiMatcher::new(|config| {
            config.match_when("class", ClassMatcher::exact("a::Error"));
            config.match_when("backtrace", BacktraceMatcher::containing("lib/a"));
        });

        assert!(matcher.matches(&event("a::Error", vec!["lib/a/x.rs:1"])));
        assert!(!matcher.matches(&event("a::Error", vec!["lib/b/x.rs:1"])));
        assert!(!matcher.matches(&event("b::Error", vec!["lib/a/x.rs:1"])));
    }

    #[test]
    fn test_any_nested_rejecter_defeats_the_match() {
        let matcher = MultiMatcher::new(|config| {
            config.match_when("class", ClassMatcher::exact("a::Error"));
            config.reject_when("vendored", BacktraceMatcher::containing("vendor/"));
        });

        assert!(matcher.matches(&event("a::Error", vec!["lib/a/x.rs:1"])));
        assert!(!matcher.matches(&event("a::Error", vec!["vendor/dep.rs:1"])));
    }

    #[test]
    fn test_empty_multi_matches_everything() {
        let matcher = MultiMatcher::new(|_| {});
        assert!(matcher.matches(&event("any::Error", vec![])));
    }

    #[test]
    fn test_from_options_resolves_nested_descriptors() {
        let matcher = crate::matchers::resolve(
            "multi",
            &json!({
                "matchers": [
                    {"name": "class", "options": {"pattern": "a::Error"}},
                    {"name": "backtrace", "options": {"pattern": "lib/a"}}
                ],
                "rejecters": [
                    {"name": "backtrace", "options": {"pattern": "vendor/"}}
                ]
            }),
        )
        .unwrap();

        assert!(matcher.matches(&event("a::Error", vec!["lib/a/x.rs:1"])));
        assert!(!matcher.matches(&event("a::Error", vec!["lib/a/x.rs:1", "vendor/d.rs:2"])));
    }
}
