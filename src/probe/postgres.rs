//! PostgreSQL probe backed by the shared connection pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::config::PROBE_QUERY;
use crate::db::Database;
use crate::error::ProbeError;

use super::{Probe, ProbeReport};

/// Asks the server for its database name and clock on a pooled connection.
///
/// The pool is borrowed per call; acquisition, reuse and connection limits are
/// left entirely to sqlx.
#[derive(Clone)]
pub struct PostgresProbe {
    pool: PgPool,
    target: String,
}

impl PostgresProbe {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
            target: database.target().to_string(),
        }
    }

    /// Classify a query failure.
    ///
    /// sqlx retries a failed connect inside `acquire` and surfaces only
    /// `PoolTimedOut`. With no open connection in the pool that means the
    /// server could not be reached at all, not that the pool was exhausted.
    fn classify(&self, err: sqlx::Error) -> ProbeError {
        match err {
            sqlx::Error::PoolTimedOut if self.pool.size() == 0 => ProbeError::Unreachable(
                format!("no connection could be opened to {}", self.target),
            ),
            other => ProbeError::from(other),
        }
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn probe(&self) -> Result<ProbeReport, ProbeError> {
        let (database, server_time): (String, DateTime<Utc>) = sqlx::query_as(PROBE_QUERY)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        Ok(ProbeReport {
            database,
            server_time,
        })
    }
}
