//! Error types for the status probe and the HTTP layer.
//!
//! `ProbeError` classifies dependency failures into a small set of kinds, each
//! with a fixed HTTP status. `AppError` covers page rendering failures and
//! renders as an HTML error page.

use std::fmt;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::config::PROBE_ERROR_HEADER;
use crate::envelope::Envelope;

/// Category of a failed probe, used for the HTTP status and for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeErrorKind {
    Unreachable,
    Auth,
    Timeout,
    Malformed,
    Query,
}

impl ProbeErrorKind {
    /// HTTP status reported for this kind of failure.
    ///
    /// | kind          | status |
    /// |---------------|--------|
    /// | `unreachable` | 500    |
    /// | `malformed`   | 500    |
    /// | `query`       | 500    |
    /// | `auth`        | 502    |
    /// | `timeout`     | 504    |
    pub fn status_code(self) -> StatusCode {
        match self {
            ProbeErrorKind::Unreachable | ProbeErrorKind::Malformed | ProbeErrorKind::Query => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProbeErrorKind::Auth => StatusCode::BAD_GATEWAY,
            ProbeErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeErrorKind::Unreachable => "unreachable",
            ProbeErrorKind::Auth => "auth",
            ProbeErrorKind::Timeout => "timeout",
            ProbeErrorKind::Malformed => "malformed",
            ProbeErrorKind::Query => "query",
        }
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("database unreachable: {0}")]
    Unreachable(String),

    #[error("database authentication failed: {0}")]
    Auth(String),

    #[error("database probe timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("malformed response from database: {0}")]
    Malformed(String),

    #[error("database error: {0}")]
    Query(String),
}

impl ProbeError {
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ProbeError::Unreachable(_) => ProbeErrorKind::Unreachable,
            ProbeError::Auth(_) => ProbeErrorKind::Auth,
            ProbeError::Timeout(_) => ProbeErrorKind::Timeout,
            ProbeError::Malformed(_) => ProbeErrorKind::Malformed,
            ProbeError::Query(_) => ProbeErrorKind::Query,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }
}

impl IntoResponse for ProbeError {
    /// Error envelope with the status from the kind table and the kind named
    /// in the `x-probe-error` header.
    fn into_response(self) -> Response {
        let kind = self.kind();
        (
            kind.status_code(),
            [(PROBE_ERROR_HEADER, kind.as_str())],
            Json(Envelope::from(&self)),
        )
            .into_response()
    }
}

/// SQLSTATE class 28: invalid authorization specification.
const SQLSTATE_AUTH_CLASS: &str = "28";

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        let message = err.to_string();
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => ProbeError::Unreachable(message),
            sqlx::Error::Database(db) => {
                let is_auth = db
                    .code()
                    .is_some_and(|code| code.starts_with(SQLSTATE_AUTH_CLASS));
                if is_auth {
                    ProbeError::Auth(db.message().to_string())
                } else {
                    ProbeError::Query(message)
                }
            }
            sqlx::Error::Protocol(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => ProbeError::Malformed(message),
            _ => ProbeError::Query(message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Internal error: {:?}", self);
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Error {}</title>
    <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
    <div class="container">
        <div class="error-page">
            <h1>Error {}</h1>
            <p>Internal server error</p>
            <a href="/">Return to status page</a>
        </div>
    </div>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}
