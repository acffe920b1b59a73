//! Integration tests for HttpReporter against a local mock collector.
//!
//! The reporter's blocking client runs on a dedicated thread via
//! `spawn_blocking`, mirroring how it would be used from async hosts.

use std::path::PathBuf;

use flare_core::{Application, CapturedError, Event, LogLocation, Reporter};
use flare_reporters::{HttpReporter, HttpReporterOptions};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_event(log_path: PathBuf) -> Event {
    let app = Application::detached("http-test");
    app.configure(|config| {
        config.set_log_location(LogLocation::Fixed(log_path));
    });
    let error =
        CapturedError::new("test::Error", "boom").with_backtrace(vec!["src/lib.rs:1:in `go'"]);
    Event::new(app, error, None)
}

#[tokio::test]
async fn test_posts_event_json_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notices"))
        .and(header("X-Api-Key", "secret"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "application": {"name": "http-test"},
            "exception": {"klass": "test::Error", "message": "boom"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("flare.log");
    let endpoint = format!("{}/notices", server.uri());
    tokio::task::spawn_blocking(move || {
        let reporter =
            HttpReporter::new(HttpReporterOptions::new(endpoint).with_api_key("secret"))?;
        reporter.report(&sample_event(log_path))
    })
    .await
    .unwrap()
    .unwrap();

    // A delivered event leaves no diagnostic trail.
    assert!(!dir.path().join("flare.log").exists());
}

#[tokio::test]
async fn test_non_success_status_propagates_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("flare.log");
    let endpoint = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let reporter =
            HttpReporter::new(HttpReporterOptions::new(endpoint).with_api_key("secret"))?;
        reporter.report(&sample_event(log_path))
    })
    .await
    .unwrap();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("rejected the event"));

    // The failure is noted in the application's diagnostic log.
    let logged = std::fs::read_to_string(dir.path().join("flare.log")).unwrap();
    assert!(logged.contains("[http-test][E]"));
    assert!(logged.contains("collector rejected the event"));
}
