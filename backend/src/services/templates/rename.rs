//! `POST /api/templates/{template_id}/rename`: changes the display name only.

use crate::error::ServiceError;
use crate::services::templates::get::get_template;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::template::Template;
use common::requests::RenameTemplateRequest;

/// Actix web handler for `POST /api/templates/{template_id}/rename`.
///
/// # Arguments
/// * `state` - The shared `AppState` holding the template store.
/// * `template_id` - The unique identifier of the template, extracted from the URL path.
/// * `payload` - The new display name.
///
/// # Returns
/// - `200 OK` with the updated `Template`; content and placeholders are unchanged.
/// - `400 Bad Request` for a blank name, `404 Not Found` for an unknown template.
pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<String>,
    payload: web::Json<RenameTemplateRequest>,
) -> impl Responder {
    match rename_template(&state, &template_id, &payload.name) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => e.error_response(),
    }
}

fn rename_template(
    state: &AppState,
    template_id: &str,
    name: &str,
) -> Result<Template, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Invalid("template name must not be empty".to_string()));
    }
    let mut template = get_template(state, template_id)?;
    template.name = name.to_string();
    template.updated_at = Utc::now();
    Ok(state.templates.save(&template, None)?)
}
