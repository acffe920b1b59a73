//! Captured errors and exception events
//!
//! An [`Event`] represents one occurrence of a captured error within an
//! application: the error itself, arbitrary extra context supplied by the
//! caller, a parsed backtrace, and a capture timestamp. Events assemble
//! their serializable map lazily and memoize the result, so every reporter
//! in a dispatch sees the identical filtered map.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::application::Application;
use crate::backtrace::Backtrace;
use crate::error::{Error, Result};
use crate::matchers;
use crate::merge::deep_merge;
use crate::ports::Matcher;

/// Placeholder used in the uniqueness fingerprint when an error carries
/// no backtrace.
const NO_BACKTRACE: &str = "[no backtrace]";

// ---------------------------------------------------------------------------
// CapturedError
// ---------------------------------------------------------------------------

/// A snapshot of a raised error: its type name, message, and raw
/// backtrace lines.
///
/// Rust errors do not carry their type or trace at runtime the way managed
/// exceptions do, so the capture happens at the point where the concrete
/// type is still known ([`CapturedError::from_error`]) or where the panic
/// machinery provides it ([`CapturedError::from_panic`]).
#[derive(Debug, Clone)]
pub struct CapturedError {
    klass: String,
    message: String,
    backtrace: Vec<String>,
}

impl CapturedError {
    /// Creates a captured error from an explicit type name and message.
    pub fn new(klass: impl Into<String>, message: impl Into<String>) -> Self {
        CapturedError {
            klass: klass.into(),
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    /// Captures a concrete error value, using its type name as the class.
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        CapturedError::new(std::any::type_name::<E>(), error.to_string())
    }

    /// Captures a panic from inside a panic hook.
    ///
    /// The payload becomes the message (or a fixed fallback for non-string
    /// payloads) and the panic location becomes a single backtrace line.
    pub fn from_panic(info: &std::panic::PanicHookInfo<'_>) -> Self {
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };

        let backtrace = info
            .location()
            .map(|loc| vec![format!("{}:{}", loc.file(), loc.line())])
            .unwrap_or_default();

        CapturedError {
            klass: "panic".to_string(),
            message,
            backtrace,
        }
    }

    /// Attaches raw backtrace lines.
    pub fn with_backtrace<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backtrace = lines.into_iter().map(Into::into).collect();
        self
    }

    /// The error's type name.
    pub fn klass(&self) -> &str {
        &self.klass
    }

    /// The error's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw backtrace lines, possibly empty.
    pub fn backtrace(&self) -> &[String] {
        &self.backtrace
    }

    /// Computes the stable uniqueness fingerprint for this error:
    /// a SHA-256 digest over the class name and raw backtrace text.
    ///
    /// Two errors of the same class with identical backtrace text produce
    /// the same fingerprint; an absent backtrace contributes a fixed
    /// placeholder instead of failing.
    pub fn uniqueness_hash(&self) -> String {
        let trace = if self.backtrace.is_empty() {
            NO_BACKTRACE.to_string()
        } else {
            self.backtrace.join("\n")
        };
        let digest = Sha256::digest(format!("{}-{}", self.klass, trace).as_bytes());
        format!("{:x}", digest)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One captured error occurrence within an application.
///
/// Events are created fresh per `report` call and are immutable after
/// construction; reporters receive a shared reference. The serializable
/// map is assembled on the first call to [`Event::to_hash`] and cached for
/// the event's lifetime.
pub struct Event {
    application: Arc<Application>,
    error: CapturedError,
    extra: Map<String, Value>,
    backtrace: Backtrace,
    occurred_at: DateTime<Utc>,
    fingerprint: OnceLock<String>,
    cached: OnceLock<Map<String, Value>>,
}

impl Event {
    /// Creates an event for the given application and error.
    ///
    /// The backtrace is parsed eagerly; `extra` defaults to an empty map.
    pub fn new(
        application: Arc<Application>,
        error: CapturedError,
        extra: Option<Map<String, Value>>,
    ) -> Self {
        let backtrace = Backtrace::parse(error.backtrace().iter().cloned());
        Event {
            application,
            error,
            extra: extra.unwrap_or_default(),
            backtrace,
            occurred_at: Utc::now(),
            fingerprint: OnceLock::new(),
            cached: OnceLock::new(),
        }
    }

    /// The application this event was captured for.
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    /// The captured error.
    pub fn error(&self) -> &CapturedError {
        &self.error
    }

    /// Extra context supplied by the caller (request metadata and the
    /// like). Data extensions and matchers may read from it.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// The parsed backtrace.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// When the event was captured.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// The memoized uniqueness fingerprint.
    pub fn uniqueness_hash(&self) -> &str {
        self.fingerprint
            .get_or_init(|| self.error.uniqueness_hash())
    }

    /// Evaluates a single matcher against this event, without a full
    /// application pipeline.
    pub fn matches_with(&self, matcher: &dyn Matcher) -> bool {
        matcher.matches(self)
    }

    /// Resolves a symbolic matcher descriptor and evaluates it against
    /// this event.
    pub fn match_named(&self, name: &str, options: &Value) -> Result<bool> {
        let matcher = matchers::resolve(name, options)?;
        Ok(matcher.matches(self))
    }

    /// The serializable event map, assembled on first call and cached.
    ///
    /// Assembly merges the application summary, exception summary, and
    /// capture timestamp, then deep-merges every inherited data extension's
    /// contribution, then applies every inherited filter in order. Repeated
    /// calls return the identical cached map.
    pub fn to_hash(&self) -> &Map<String, Value> {
        self.cached.get_or_init(|| self.assemble())
    }

    /// Serializes the (cached) event map as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self.to_hash()).map_err(Error::from)
    }

    fn assemble(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "application".to_string(),
            json!({ "name": self.application.name() }),
        );
        data.insert(
            "exception".to_string(),
            json!({
                "klass": self.error.klass(),
                "message": self.error.message(),
                "backtrace": self.backtrace,
                "uniqueness_hash": self.uniqueness_hash(),
            }),
        );
        data.insert("occurred_at".to_string(), json!(self.occurred_at.timestamp()));

        // Own extensions first, then ancestors', per inherited pipeline order.
        for extension in self.application.inherited_data_extensions().values() {
            if let Some(Value::Object(contribution)) = extension.extend(self) {
                deep_merge(&mut data, contribution);
            }
        }

        let mut data = data;
        for filter in self.application.inherited_filters().values() {
            data = filter.call(data);
        }
        data
    }
}
