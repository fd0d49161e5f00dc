//! Tera template setup.
//!
//! Templates are compiled into the binary so the service does not depend on
//! its working directory; only `/static` assets are read from disk.

use tera::Tera;

use crate::error::AppError;

/// Name under which the status page template is registered
pub const INDEX_TEMPLATE: &str = "index.html";

const INDEX_SOURCE: &str = include_str!("../templates/index.html");

/// Initialize the Tera template engine
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(INDEX_TEMPLATE, INDEX_SOURCE)?;
    Ok(tera)
}
