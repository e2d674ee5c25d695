use anyhow::anyhow;
use axum::response::Html;
use handlebars::Handlebars;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::AppError;

static TEMPLATES: OnceCell<Handlebars<'static>> = OnceCell::new();

/// Register every `.html` file in `template_dir`. Idempotent so test
/// binaries can call it from several places.
pub fn init(template_dir: &str) -> Result<(), String> {
    TEMPLATES
        .get_or_try_init(|| {
            let mut h = Handlebars::new();
            h.register_templates_directory(".html", template_dir)
                .map_err(|e| {
                    format!("Error registering templates directory {template_dir}: {e}")
                })?;
            Ok::<_, String>(h)
        })
        .map(|_| ())
}

pub fn render<S: Serialize>(name: &str, data: &S) -> Result<Html<String>, AppError> {
    let templates = TEMPLATES
        .get()
        .ok_or_else(|| anyhow!("templates not initialized"))?;

    Ok(Html(templates.render(name, data)?))
}
