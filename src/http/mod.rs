//! HTTP server module.
//!
//! Binds the router on the configured address and drains in-flight requests
//! on SIGTERM/SIGINT before returning control to the caller.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
