//! End-to-end dispatch tests composing the built-in matchers, filters,
//! extensions, and the panic hook through real `report` calls.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use flare_core::filters::KeyFilter;
use flare_core::matchers::LocalRequestMatcher;
use flare_core::{Application, CapturedError, Event, Registry, ReportOutcome};
use serde_json::json;

fn capturing_reporter(
    captured: &Arc<Mutex<Vec<serde_json::Value>>>,
) -> impl Fn(&Event) -> anyhow::Result<()> + Send + Sync {
    let captured = Arc::clone(captured);
    move |event| {
        captured
            .lock()
            .unwrap()
            .push(serde_json::Value::Object(event.to_hash().clone()));
        Ok(())
    }
}

fn charge_error() -> CapturedError {
    CapturedError::new("billing::ChargeError", "card declined")
        .with_backtrace(vec!["src/billing.rs:10:in `charge'"])
}

#[test]
fn test_full_pipeline_with_builtins() {
    let captured = Arc::new(Mutex::new(Vec::new()));

    let app = Application::detached("storefront");
    app.configure(|config| {
        config.reject_when("local", LocalRequestMatcher::new());
        config
            .match_named("class", &json!({"pattern": "^billing::", "regex": true}))
            .unwrap();
        config.data_extension("request", |event: &Event| {
            Some(json!({ "request": event.extra().clone() }))
        });
        config.filter("redact", KeyFilter::new(["password"]));
        config.reporter("capture", capturing_reporter(&captured));
    });

    // A local request is rejected outright.
    let mut local = serde_json::Map::new();
    local.insert("remote_ip".to_string(), json!("127.0.0.1"));
    local.insert("password".to_string(), json!("hunter2"));
    let outcome = app.report(&charge_error(), Some(local)).unwrap();
    assert!(matches!(outcome, ReportOutcome::Rejected { .. }));
    assert!(captured.lock().unwrap().is_empty());

    // A foreign error class is dropped by the matcher.
    let other = CapturedError::new("auth::LoginError", "nope");
    assert_eq!(app.report(&other, None).unwrap(), ReportOutcome::Unmatched);

    // A remote billing error flows through extension, filter, reporter.
    let mut remote = serde_json::Map::new();
    remote.insert("remote_ip".to_string(), json!("203.0.113.9"));
    remote.insert("password".to_string(), json!("hunter2"));
    let outcome = app.report(&charge_error(), Some(remote)).unwrap();
    assert_eq!(outcome, ReportOutcome::Reported);

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let data = &captured[0];
    assert_eq!(data["application"]["name"], json!("storefront"));
    assert_eq!(data["exception"]["klass"], json!("billing::ChargeError"));
    assert_eq!(data["request"]["remote_ip"], json!("203.0.113.9"));
    assert_eq!(data["request"]["password"], json!("[FILTERED]"));
    assert!(data["host_environment"]["os"].is_string());
}

#[test]
fn test_route_tree_reports_through_global_registry_app() {
    let registry = Registry::new();
    let parent_hits = Arc::new(Mutex::new(Vec::new()));
    let child_hits = Arc::new(Mutex::new(Vec::new()));

    let app = Application::with_registry("api", &registry).unwrap();
    app.configure(|config| {
        config.data_extension("service", |_: &Event| Some(json!({"service": "api"})));
        config.reporter("parent", capturing_reporter(&parent_hits));
    });

    let checkout = app.route("checkout");
    checkout.configure(|config| {
        config.reporter("child", capturing_reporter(&child_hits));
    });

    assert!(registry.find("checkout").is_none());

    app.report(&charge_error(), None).unwrap();

    assert_eq!(parent_hits.lock().unwrap().len(), 1);
    let child_hits = child_hits.lock().unwrap();
    assert_eq!(child_hits.len(), 1);
    // The route's event includes the parent-contributed extension and
    // names the route itself.
    assert_eq!(child_hits[0]["service"], json!("api"));
    assert_eq!(child_hits[0]["application"]["name"], json!("checkout"));
}

#[test]
fn test_panic_hook_reports_matching_panics() {
    let captured = Arc::new(Mutex::new(Vec::new()));

    let app = Application::detached("panicking");
    app.configure(|config| {
        // Scope the hook to this test's panic, so unrelated test panics
        // (the hook is process-global) are ignored.
        config.match_when("own-panic", |e: &Event| {
            e.error().message() == "panic-hook-test"
        });
        config.reporter("capture", capturing_reporter(&captured));
    });
    app.rescue_panics();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        panic!("panic-hook-test");
    }));
    assert!(result.is_err());

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0]["exception"]["klass"], json!("panic"));
    assert_eq!(captured[0]["exception"]["message"], json!("panic-hook-test"));
}

#[test]
fn test_panic_hook_skips_already_reported_fingerprint() {
    let captured = Arc::new(Mutex::new(Vec::new()));

    let app = Application::detached("deduping");
    app.configure(|config| {
        config.match_when("own-panic", |e: &Event| {
            e.error().message() == "dedupe-hook-test"
        });
        config.reporter("capture", capturing_reporter(&captured));
    });
    app.rescue_panics();

    // Report the same occurrence manually first, as an application would
    // just before unwinding.
    let panic_line = line!() + 7;
    let manual = CapturedError::new("panic", "dedupe-hook-test")
        .with_backtrace(vec![format!("{}:{}", file!(), panic_line)]);
    app.report(&manual, None).unwrap();
    assert_eq!(captured.lock().unwrap().len(), 1);

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        panic!("dedupe-hook-test");
    }));
    assert!(result.is_err());

    // The hook saw an identical fingerprint and did not report again.
    assert_eq!(captured.lock().unwrap().len(), 1);
}
