//! dbpulse: a small HTTP service reporting whether its PostgreSQL dependency
//! is reachable.
//!
//! `GET /status` runs one probe per request through [`probe::StatusChecker`]
//! and answers with an [`envelope::Envelope`]; `GET /hello` is a static
//! greeting and `GET /` serves a page that polls both.

pub mod client;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod http;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod state;
pub mod templates;

pub use envelope::Envelope;
pub use error::{AppError, ProbeError, ProbeErrorKind};
