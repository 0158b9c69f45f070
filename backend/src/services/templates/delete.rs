//! `DELETE /api/templates/{template_id}`: removes the record and its stored
//! Word document. Deleting an unknown id is not an error.

use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::info;

/// Actix web handler for `DELETE /api/templates/{template_id}`.
///
/// # Arguments
/// * `state` - The shared `AppState` holding the template store.
/// * `template_id` - The unique identifier of the template, extracted from the URL path.
///
/// # Returns
/// - `204 No Content` once the template and its document are gone.
/// - `503 Service Unavailable` if the store cannot be updated.
pub async fn process(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    let template_id = template_id.into_inner();
    match state.templates.delete(&template_id) {
        Ok(()) => {
            info!("Template {} deleted", template_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => ServiceError::from(e).error_response(),
    }
}
