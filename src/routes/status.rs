//! Database status endpoint.
//!
//! Probes the database once per request through the shared `StatusChecker`
//! and answers with the normalized envelope: `200` with the database name and
//! server time on success, or an error envelope whose status comes from the
//! error-kind table in `crate::error`.

use axum::{extract::State, Json};
use tracing::instrument;

use crate::envelope::Envelope;
use crate::error::ProbeError;
use crate::state::AppState;

#[instrument(name = "status::status", skip(state))]
pub async fn status(State(state): State<AppState>) -> Result<Json<Envelope>, ProbeError> {
    let report = state.status.check().await?;
    Ok(Json(Envelope::from(report)))
}
