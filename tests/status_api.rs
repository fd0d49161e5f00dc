//! Router-level tests for the JSON endpoints, the page and the health check.
//!
//! Probes are faked through the `Probe` trait, so no database is needed.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::future::join_all;
use serde_json::json;
use tower::ServiceExt;

use common::*;
use dbpulse::config::{HELLO_MESSAGE, PROBE_ERROR_HEADER};
use dbpulse::ProbeError;

#[tokio::test]
async fn hello_returns_greeting() {
    let response = app_with(Arc::new(FixedProbe::testdb()))
        .oneshot(get("/hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert_eq!(body_json(response).await, json!({ "message": HELLO_MESSAGE }));
}

#[tokio::test]
async fn status_ok_envelope() {
    let response = app_with(Arc::new(FixedProbe::testdb()))
        .oneshot(get("/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert!(response.headers().get(PROBE_ERROR_HEADER).is_none());
    assert_eq!(
        body_json(response).await,
        json!({
            "status": "ok",
            "database": "testdb",
            "serverTime": "2024-01-01T00:00:00Z"
        })
    );
}

#[tokio::test]
async fn status_unreachable_is_500() {
    let probe = FailingProbe(ProbeError::Unreachable(
        "Connection refused (os error 111)".to_string(),
    ));
    let response = app_with(Arc::new(probe))
        .oneshot(get("/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[PROBE_ERROR_HEADER], "unreachable");
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Connection refused"));
    assert!(body.get("database").is_none());
}

#[tokio::test]
async fn status_malformed_is_500() {
    let probe = FailingProbe(ProbeError::Malformed("no rows returned".to_string()));
    let response = app_with(Arc::new(probe))
        .oneshot(get("/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[PROBE_ERROR_HEADER], "malformed");
}

#[tokio::test]
async fn status_auth_failure_is_502() {
    let probe = FailingProbe(ProbeError::Auth(
        "password authentication failed for user \"postgres\"".to_string(),
    ));
    let response = app_with(Arc::new(probe))
        .oneshot(get("/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers()[PROBE_ERROR_HEADER], "auth");
    let body = body_json(response).await;
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn status_slow_probe_is_504() {
    let app = app_with_timeout(
        Arc::new(SlowProbe(Duration::from_secs(30))),
        Duration::from_millis(100),
    );
    let response = app.oneshot(get("/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.headers()[PROBE_ERROR_HEADER], "timeout");
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn repeated_checks_are_independent() {
    let probe = Arc::new(ClockProbe::default());
    let app = app_with(probe.clone());

    let mut previous: Option<chrono::DateTime<chrono::Utc>> = None;
    for _ in 0..5 {
        let issued = chrono::Utc::now();
        let response = app.clone().oneshot(get("/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let server_time = chrono::DateTime::parse_from_rfc3339(body["serverTime"].as_str().unwrap())
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert!(server_time >= issued);
        if let Some(previous) = previous {
            assert!(server_time >= previous);
        }
        previous = Some(server_time);
    }

    assert_eq!(probe.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn fifty_concurrent_checks_all_succeed() {
    let probe = Arc::new(ClockProbe::default());
    let app = app_with(probe.clone());

    let responses = join_all((0..50).map(|_| app.clone().oneshot(get("/status")))).await;

    for response in responses {
        let response = response.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
    assert_eq!(probe.calls.load(Ordering::SeqCst), 50);
}

#[tokio::test]
async fn health_does_not_probe() {
    let probe = Arc::new(ClockProbe::default());
    let response = app_with(probe.clone())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert_eq!(body_text(response).await, "ok");
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn index_renders_page() {
    let response = app_with(Arc::new(FixedProbe::testdb()))
        .oneshot(get("/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<title>dbpulse</title>"));
    assert!(html.contains(r#"id="status""#));
}

#[tokio::test]
async fn static_assets_are_served() {
    let response = app_with(Arc::new(FixedProbe::testdb()))
        .oneshot(get("/static/js/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "public, max-age=3600");
    let script = body_text(response).await;
    assert!(script.contains("/status"));
    // Out-of-date responses are ignored when polling overlaps
    assert!(script.contains("latest.get(el) === seq"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = app_with(Arc::new(FixedProbe::testdb()))
        .oneshot(get("/hello"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
