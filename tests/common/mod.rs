//! Fake probes and router helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use dbpulse::config::AppConfig;
use dbpulse::probe::{Probe, ProbeReport, StatusChecker};
use dbpulse::routes::create_router;
use dbpulse::state::AppState;
use dbpulse::templates::init_templates;
use dbpulse::ProbeError;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Always reports the same database and time.
pub struct FixedProbe {
    pub database: String,
    pub server_time: DateTime<Utc>,
}

impl FixedProbe {
    pub fn testdb() -> Self {
        Self {
            database: "testdb".to_string(),
            server_time: new_year(),
        }
    }
}

#[async_trait]
impl Probe for FixedProbe {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn probe(&self) -> Result<ProbeReport, ProbeError> {
        Ok(ProbeReport {
            database: self.database.clone(),
            server_time: self.server_time,
        })
    }
}

/// Reports the current time and counts its invocations.
#[derive(Default)]
pub struct ClockProbe {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Probe for ClockProbe {
    fn name(&self) -> &str {
        "clock"
    }

    async fn probe(&self) -> Result<ProbeReport, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(ProbeReport {
            database: "testdb".to_string(),
            server_time: Utc::now(),
        })
    }
}

/// Fails every call with the given error.
pub struct FailingProbe(pub ProbeError);

#[async_trait]
impl Probe for FailingProbe {
    fn name(&self) -> &str {
        "failing"
    }

    async fn probe(&self) -> Result<ProbeReport, ProbeError> {
        Err(self.0.clone())
    }
}

/// Takes longer than any test timeout.
pub struct SlowProbe(pub Duration);

#[async_trait]
impl Probe for SlowProbe {
    fn name(&self) -> &str {
        "slow"
    }

    async fn probe(&self) -> Result<ProbeReport, ProbeError> {
        tokio::time::sleep(self.0).await;
        Ok(ProbeReport {
            database: "testdb".to_string(),
            server_time: Utc::now(),
        })
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.ui.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string();
    config
}

pub fn app_with_timeout(probe: Arc<dyn Probe>, timeout: Duration) -> Router {
    let checker = StatusChecker::new(probe, timeout);
    let state = AppState::new(test_config(), init_templates().unwrap(), checker);
    create_router(state)
}

pub fn app_with(probe: Arc<dyn Probe>) -> Router {
    app_with_timeout(probe, PROBE_TIMEOUT)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
