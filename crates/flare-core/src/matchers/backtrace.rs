//! Backtrace matcher
//!
//! Matches events whose raw backtrace contains a given substring or regex,
//! optionally bounded to the first N frames. An event without a backtrace
//! never matches.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{invalid_options, MatcherFactory};
use crate::error::Result;
use crate::event::Event;
use crate::ports::Matcher;

enum LinePattern {
    Substring(String),
    Regex(Regex),
}

impl LinePattern {
    fn matches(&self, line: &str) -> bool {
        match self {
            LinePattern::Substring(s) => line.contains(s.as_str()),
            LinePattern::Regex(pattern) => pattern.is_match(line),
        }
    }
}

/// Matches events by backtrace content.
pub struct BacktraceMatcher {
    pattern: LinePattern,
    depth: Option<usize>,
}

impl BacktraceMatcher {
    /// Matches backtrace lines containing the given substring.
    pub fn containing(fragment: impl Into<String>) -> Self {
        BacktraceMatcher {
            pattern: LinePattern::Substring(fragment.into()),
            depth: None,
        }
    }

    /// Matches backtrace lines against a regular expression.
    pub fn matching(pattern: Regex) -> Self {
        BacktraceMatcher {
            pattern: LinePattern::Regex(pattern),
            depth: None,
        }
    }

    /// Bounds the search to the first `depth` frames.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}

impl Matcher for BacktraceMatcher {
    fn matches(&self, event: &Event) -> bool {
        for (index, line) in event.error().backtrace().iter().enumerate() {
            if self.pattern.matches(line) {
                return true;
            }
            if let Some(depth) = self.depth {
                if depth <= index + 1 {
                    return false;
                }
            }
        }
        false
    }
}

#[derive(Deserialize)]
struct Options {
    pattern: String,
    #[serde(default)]
    regex: bool,
    #[serde(default)]
    depth: Option<usize>,
}

pub(crate) fn register(map: &mut HashMap<&'static str, MatcherFactory>) {
    map.insert("backtrace", from_options);
}

fn from_options(options: &Value) -> Result<Arc<dyn Matcher>> {
    let options: Options =
        serde_json::from_value(options.clone()).map_err(|e| invalid_options("backtrace", e))?;
    let mut matcher = if options.regex {
        BacktraceMatcher::matching(
            Regex::new(&options.pattern).map_err(|e| invalid_options("backtrace", e))?,
        )
    } else {
        BacktraceMatcher::containing(options.pattern)
    };
    if let Some(depth) = options.depth {
        matcher = matcher.with_depth(depth);
    }
    Ok(Arc::new(matcher))
}
