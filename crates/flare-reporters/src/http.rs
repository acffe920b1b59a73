//! HTTP reporter
//!
//! POSTs the event JSON to a remote collector endpoint, authenticated with
//! an API key header. The request runs inline on the reporting thread with
//! short timeouts and no retries; a non-success status is noted in the
//! application's diagnostic log and propagates like any other reporter
//! failure.

use std::time::Duration;

use anyhow::Context;
use flare_core::{Error, Event, Reporter};

/// Header carrying the collector API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Options for building an [`HttpReporter`].
///
/// `endpoint` and `api_key` are required; the timeouts default to two
/// seconds to connect and five to read.
pub struct HttpReporterOptions {
    /// Collector URL the event JSON is POSTed to
    pub endpoint: String,
    /// Collector API key; building fails without one
    pub api_key: Option<String>,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl HttpReporterOptions {
    /// Creates options for the given endpoint with default timeouts and
    /// no API key yet.
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpReporterOptions {
            endpoint: endpoint.into(),
            api_key: None,
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Reports events to a remote collector over HTTP.
#[derive(Debug)]
pub struct HttpReporter {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpReporter {
    /// Builds the reporter, validating required options and constructing
    /// the HTTP client.
    pub fn new(options: HttpReporterOptions) -> anyhow::Result<Self> {
        let api_key = options.api_key.ok_or(Error::MissingOption {
            subject: "HttpReporter".to_string(),
            option: "api_key".to_string(),
        })?;

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(HttpReporter {
            endpoint: options.endpoint,
            api_key,
            client,
        })
    }
}

impl Reporter for HttpReporter {
    fn report(&self, event: &Event) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(event.to_json()?)
            .send();

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                event
                    .application()
                    .logger()
                    .error(format!("HttpReporter: failed to send: {err}"));
                return Err(err)
                    .with_context(|| format!("failed to POST event to {}", self.endpoint));
            }
        };

        if let Err(err) = response.error_for_status() {
            event
                .application()
                .logger()
                .error(format!("HttpReporter: collector rejected the event: {err}"));
            return Err(err)
                .with_context(|| format!("collector at {} rejected the event", self.endpoint));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_a_configuration_error() {
        let err = HttpReporter::new(HttpReporterOptions::new("http://localhost:1")).unwrap_err();
        let core = err.downcast_ref::<Error>().expect("core error");
        assert!(matches!(core, Error::MissingOption { subject, option }
            if subject == "HttpReporter" && option == "api_key"));
    }
}
