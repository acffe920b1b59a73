//! Backtrace parsing
//!
//! Parses raw backtrace lines of the form `file:line` or
//! ``file:line:in `method'`` into structured frames. Parsing is lenient:
//! a malformed line produces a frame with `None` fields rather than an
//! error, and a missing backtrace produces an empty frame list.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([^:]+):(\d+)(?::in `([^']+)')?$").expect("backtrace line pattern is valid")
    })
}

/// A single parsed backtrace frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Source file, when the line parsed
    pub file: Option<String>,
    /// Line number, when the line parsed
    pub line: Option<u32>,
    /// Method or function name, when present in the line
    pub method: Option<String>,
}

impl Frame {
    /// Parses one raw backtrace line.
    ///
    /// Lines that do not match the expected shape yield a frame with all
    /// fields `None`.
    pub fn parse(raw: &str) -> Self {
        match line_pattern().captures(raw) {
            Some(caps) => Frame {
                file: caps.get(1).map(|m| m.as_str().to_string()),
                line: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                method: caps.get(3).map(|m| m.as_str().to_string()),
            },
            None => Frame {
                file: None,
                line: None,
                method: None,
            },
        }
    }
}

/// A parsed backtrace: the original raw lines plus structured frames.
#[derive(Debug, Clone, Default)]
pub struct Backtrace {
    original: Vec<String>,
    frames: Vec<Frame>,
}

// Serializes as a bare array of frames; the raw lines are not part of the
// event serialization contract.
impl Serialize for Backtrace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.frames.serialize(serializer)
    }
}

impl Backtrace {
    /// Parses the given raw lines into frames.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let original: Vec<String> = lines.into_iter().map(Into::into).collect();
        let frames = original.iter().map(|l| Frame::parse(l)).collect();
        Backtrace { original, frames }
    }

    /// The raw lines this backtrace was parsed from.
    pub fn original(&self) -> &[String] {
        &self.original
    }

    /// The parsed frames, in original order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Converts the rendered form of a [`std::backtrace::Backtrace`] into raw
/// lines in the `file:line:in \`method'` shape this module parses.
///
/// The standard library renders captured backtraces as alternating
/// `N: symbol` and `at path:line:col` lines; frames without a resolved
/// location are skipped.
pub fn normalize_std_backtrace(rendered: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut symbol: Option<&str> = None;

    for line in rendered.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("at ") {
            // Drop the trailing column, keeping `path:line`.
            let location = match rest.rfind(':') {
                Some(idx) if rest[idx + 1..].chars().all(|c| c.is_ascii_digit()) => &rest[..idx],
                _ => rest,
            };
            match symbol.take() {
                Some(sym) => lines.push(format!("{}:in `{}'", location, sym)),
                None => lines.push(location.to_string()),
            }
        } else if let Some((_, sym)) = trimmed.split_once(": ") {
            symbol = Some(sym);
        }
    }

    lines
}
