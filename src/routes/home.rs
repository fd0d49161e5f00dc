//! Status page handler.
//!
//! Renders the presentation page. The page itself fetches `/hello` and
//! `/status` from the browser, so rendering never waits on the database.

use axum::{extract::State, response::Html, Extension};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::templates::INDEX_TEMPLATE;

#[instrument(name = "home::index", skip(state, request_id), fields(request_id = %request_id.0))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Html<String>, AppError> {
    let mut context = tera::Context::new();
    context.insert("config", &state.config.ui);

    let html = state.tera.render(INDEX_TEMPLATE, &context)?;
    Ok(Html(html))
}
