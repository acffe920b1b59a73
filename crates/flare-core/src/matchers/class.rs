//! Error class matcher
//!
//! Matches events whose error has a specific type name, exactly or by
//! regular expression. Rust has no runtime class hierarchy to walk, but
//! type names are fully qualified paths, so a regex over the path prefix
//! matches a whole family of errors:
//!
//! ```
//! use flare_core::matchers::ClassMatcher;
//! use regex::Regex;
//!
//! let exact = ClassMatcher::exact("billing::ChargeError");
//! let family = ClassMatcher::matching(Regex::new(r"^billing::").unwrap());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{invalid_options, MatcherFactory};
use crate::error::Result;
use crate::event::Event;
use crate::ports::Matcher;

enum ClassPattern {
    Exact(String),
    Regex(Regex),
}

/// Matches events by error type name.
pub struct ClassMatcher {
    pattern: ClassPattern,
}

impl ClassMatcher {
    /// Matches the exact type name.
    pub fn exact(name: impl Into<String>) -> Self {
        ClassMatcher {
            pattern: ClassPattern::Exact(name.into()),
        }
    }

    /// Matches type names against a regular expression.
    pub fn matching(pattern: Regex) -> Self {
        ClassMatcher {
            pattern: ClassPattern::Regex(pattern),
        }
    }
}

impl Matcher for ClassMatcher {
    fn matches(&self, event: &Event) -> bool {
        let klass = event.error().klass();
        match &self.pattern {
            ClassPattern::Exact(name) => klass == name,
            ClassPattern::Regex(pattern) => pattern.is_match(klass),
        }
    }
}

#[derive(Deserialize)]
struct Options {
    pattern: String,
    #[serde(default)]
    regex: bool,
}

pub(crate) fn register(map: &mut HashMap<&'static str, MatcherFactory>) {
    map.insert("class", from_options);
}

fn from_options(options: &Value) -> Result<Arc<dyn Matcher>> {
    let options: Options =
        serde_json::from_value(options.clone()).map_err(|e| invalid_options("class", e))?;
    let matcher = if options.regex {
        ClassMatcher::matching(Regex::new(&options.pattern).map_err(|e| invalid_options("class", e))?)
    } else {
        ClassMatcher::exact(options.pattern)
    };
    Ok(Arc::new(matcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::event::CapturedError;
    use serde_json::json;

    fn event_for(klass: &str) -> Event {
        let app = Application::detached("class-matcher");
        Event::new(app, CapturedError::new(klass, "boom"), None)
    }

    #[test]
    fn test_exact_match() {
        let matcher = ClassMatcher::exact("billing::ChargeError");
        assert!(matcher.matches(&event_for("billing::ChargeError")));
        assert!(!matcher.matches(&event_for("billing::RefundError")));
    }

    #[test]
    fn test_regex_matches_a_family() {
        let matcher = ClassMatcher::matching(Regex::new(r"^billing::").unwrap());
        assert!(matcher.matches(&event_for("billing::ChargeError")));
        assert!(matcher.matches(&event_for("billing::RefundError")));
        assert!(!matcher.matches(&event_for("auth::LoginError")));
    }

    #[test]
    fn test_from_options() {
        let exact = crate::matchers::resolve("class", &json!({"pattern": "a::B"})).unwrap();
        assert!(exact.matches(&event_for("a::B")));
        assert!(!exact.matches(&event_for("a::Bx")));

        let regexed =
            crate::matchers::resolve("class", &json!({"pattern": "^a::", "regex": true})).unwrap();
        assert!(regexed.matches(&event_for("a::Bx")));
    }

    #[test]
    fn test_from_options_rejects_bad_regex() {
        let err = crate::matchers::resolve("class", &json!({"pattern": "(", "regex": true}))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            crate::error::Error::InvalidDescriptorOptions { .. }
        ));
    }
}
