//! Local request matcher
//!
//! Matches events whose originating request came from a local IP address,
//! typically used as a rejecter so development traffic is never reported.
//! The remote IP is read from the event's serialized hash through a
//! configurable accessor; any accessor failure counts as a non-match.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{invalid_options, MatcherFactory};
use crate::error::Result;
use crate::event::Event;
use crate::ports::Matcher;

/// Default location of the remote IP in the event hash.
const DEFAULT_REMOTE_IP_POINTER: &str = "/request/remote_ip";

fn default_localhost() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"^127\.0\.0\.\d{1,3}$").expect("localhost IPv4 pattern is valid"),
            Regex::new(r"^::1$").expect("localhost IPv6 pattern is valid"),
            Regex::new(r"^0:0:0:0:0:0:0:1(%.*)?$").expect("localhost IPv6 long pattern is valid"),
        ]
    })
}

enum RemoteIp {
    /// A JSON-pointer-style path into the event hash
    Pointer(String),
    /// An arbitrary accessor function
    Accessor(Arc<dyn Fn(&Event) -> Option<String> + Send + Sync>),
}

/// Matches events originating from a local IP address.
pub struct LocalRequestMatcher {
    localhost: Vec<Regex>,
    remote_ip: RemoteIp,
}

impl LocalRequestMatcher {
    /// Creates a matcher with the default localhost patterns and the
    /// default remote IP location (`/request/remote_ip`).
    pub fn new() -> Self {
        LocalRequestMatcher {
            localhost: default_localhost().to_vec(),
            remote_ip: RemoteIp::Pointer(DEFAULT_REMOTE_IP_POINTER.to_string()),
        }
    }

    /// Reads the remote IP from a different path in the event hash.
    pub fn with_remote_ip_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.remote_ip = RemoteIp::Pointer(pointer.into());
        self
    }

    /// Reads the remote IP through an arbitrary accessor.
    pub fn with_remote_ip_accessor(
        mut self,
        accessor: impl Fn(&Event) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.remote_ip = RemoteIp::Accessor(Arc::new(accessor));
        self
    }

    /// Replaces the localhost patterns.
    pub fn with_localhost(mut self, patterns: Vec<Regex>) -> Self {
        self.localhost = patterns;
        self
    }

    fn remote_ip(&self, event: &Event) -> Option<String> {
        match &self.remote_ip {
            RemoteIp::Pointer(pointer) => {
                lookup(event.to_hash(), pointer).and_then(|v| v.as_str().map(String::from))
            }
            RemoteIp::Accessor(accessor) => accessor(event),
        }
    }
}

impl Default for LocalRequestMatcher {
    fn default() -> Self {
        LocalRequestMatcher::new()
    }
}

impl Matcher for LocalRequestMatcher {
    fn matches(&self, event: &Event) -> bool {
        match self.remote_ip(event) {
            Some(ip) => self.localhost.iter().any(|pattern| pattern.is_match(&ip)),
            // No request information: not a local request.
            None => false,
        }
    }
}

// Minimal JSON-pointer walk over a map, so we do not have to clone the
// cached event hash into a Value just to use Value::pointer.
fn lookup<'a>(map: &'a Map<String, Value>, pointer: &str) -> Option<&'a Value> {
    let mut segments = pointer.split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;
    let mut current = map.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[derive(Deserialize)]
struct Options {
    #[serde(default)]
    remote_ip_pointer: Option<String>,
}

pub(crate) fn register(map: &mut HashMap<&'static str, MatcherFactory>) {
    map.insert("local_request", from_options);
}

fn from_options(options: &Value) -> Result<Arc<dyn Matcher>> {
    let options: Options = serde_json::from_value(options.clone())
        .map_err(|e| invalid_options("local_request", e))?;
    let mut matcher = LocalRequestMatcher::new();
    if let Some(pointer) = options.remote_ip_pointer {
        matcher = matcher.with_remote_ip_pointer(pointer);
    }
    Ok(Arc::new(matcher))
}
