//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::AppConfig;
use crate::probe::StatusChecker;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, Tera template engine, and the
/// status checker that probes the database dependency.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub status: StatusChecker,
}

impl AppState {
    /// Creates a new application state from the given configuration, templates, and checker.
    pub fn new(config: AppConfig, tera: Tera, status: StatusChecker) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            status,
        }
    }
}
