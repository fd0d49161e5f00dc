//! Owned handle to the PostgreSQL connection pool.
//!
//! The pool is created once at startup without opening any connection; the
//! first probe connects. `close` is called after the HTTP server has drained so
//! in-flight probes finish before connections are torn down.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    target: String,
}

impl Database {
    /// Build a lazily-connecting pool from configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(config.connect_options());

        tracing::debug!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            max_connections = config.max_connections,
            "Created lazy database pool"
        );

        Self {
            pool,
            target: format!("{}:{}", config.host, config.port),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `host:port` the pool connects to, for error messages
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Close all pooled connections, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
