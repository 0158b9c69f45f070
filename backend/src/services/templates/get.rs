//! # Template Retrieval Service
//!
//! `GET /api/templates` lists every template, most recently updated first.
//! `GET /api/templates/{template_id}` returns one template, including its
//! derived placeholder list, or `404 Not Found`.

use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::template::Template;

/// Actix web handler for `GET /api/templates/{template_id}`.
pub async fn process(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    match get_template(&state, &template_id) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => e.error_response(),
    }
}

/// Actix web handler for `GET /api/templates`.
pub async fn list(state: web::Data<AppState>) -> impl Responder {
    match state.templates.list() {
        Ok(templates) => HttpResponse::Ok().json(templates),
        Err(e) => ServiceError::from(e).error_response(),
    }
}

pub(crate) fn get_template(state: &AppState, template_id: &str) -> Result<Template, ServiceError> {
    state
        .templates
        .get(template_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("template {}", template_id)))
}
