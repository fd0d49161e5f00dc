//! Dependency probing.
//!
//! A `Probe` performs one read-only round trip against an external dependency.
//! `StatusChecker` owns a probe behind an `Arc`, bounds every call with the
//! configured timeout, and logs the outcome. It holds no per-call state, so a
//! single checker is cloned into every request handler.

mod postgres;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProbeError;

pub use postgres::PostgresProbe;

/// Metadata reported by a healthy dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Name of the database the probe ran against
    pub database: String,
    /// The dependency's own clock
    pub server_time: DateTime<Utc>,
}

#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name of the dependency, used in logs
    fn name(&self) -> &str;

    /// Run a single probe round trip.
    async fn probe(&self) -> Result<ProbeReport, ProbeError>;
}

/// Runs a probe per call, bounded by a timeout.
#[derive(Clone)]
pub struct StatusChecker {
    probe: Arc<dyn Probe>,
    timeout: Duration,
}

impl StatusChecker {
    pub fn new(probe: Arc<dyn Probe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    /// Probe the dependency once.
    ///
    /// Exceeding the timeout drops the in-flight probe and yields
    /// `ProbeError::Timeout`. Nothing is retried.
    pub async fn check(&self) -> Result<ProbeReport, ProbeError> {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.probe.probe()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(report) => tracing::debug!(
                dependency = %self.probe.name(),
                database = %report.database,
                elapsed_ms,
                "Probe succeeded"
            ),
            Err(e) => tracing::warn!(
                dependency = %self.probe.name(),
                kind = %e.kind(),
                error = %e,
                elapsed_ms,
                "Probe failed"
            ),
        }

        result
    }
}
