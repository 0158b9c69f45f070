//! Manual form drafts, scoped by a client-chosen session id.
//!
//! - `GET /api/drafts/{session_id}`: the saved values, or an empty object.
//! - `PUT /api/drafts/{session_id}`: replaces the saved values.
//! - `DELETE /api/drafts/{session_id}`: forgets every draft of the session.
//!
//! Drafts survive restarts and are cleared after a successful manual merge.

use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{delete, get, put, scope};
use actix_web::{web, HttpResponse, Responder, ResponseError, Scope};
use common::model::data_row::DataRow;
use log::warn;

const API_PATH: &str = "/api/drafts";

/// Draft key holding the manual entry form.
pub const MANUAL_FORM_KEY: &str = "manual_form_data";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{session_id}", get().to(load))
        .route("/{session_id}", put().to(store))
        .route("/{session_id}", delete().to(clear))
}

/// Actix web handler for `GET /api/drafts/{session_id}`.
///
/// # Arguments
/// * `state` - The shared `AppState` holding the draft store.
/// * `session_id` - The draft scope, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the saved values, or `{}` when nothing is saved.
async fn load(state: web::Data<AppState>, session_id: web::Path<String>) -> impl Responder {
    match load_draft(&state, &session_id) {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => e.error_response(),
    }
}

/// Actix web handler for `PUT /api/drafts/{session_id}`.
///
/// # Arguments
/// * `state` - The shared `AppState` holding the draft store.
/// * `session_id` - The draft scope, extracted from the URL path.
/// * `payload` - The form values to keep, as a `DataRow`.
///
/// # Returns
/// - `204 No Content` once stored, replacing any earlier draft.
async fn store(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    payload: web::Json<DataRow>,
) -> impl Responder {
    let result = serde_json::to_string(&payload.into_inner())
        .map_err(|e| ServiceError::Invalid(e.to_string()))
        .and_then(|value| {
            state
                .drafts
                .store(&session_id, MANUAL_FORM_KEY, &value)
                .map_err(ServiceError::from)
        });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

/// Actix web handler for `DELETE /api/drafts/{session_id}`.
///
/// # Returns
/// - `204 No Content`, whether or not the session had drafts.
async fn clear(state: web::Data<AppState>, session_id: web::Path<String>) -> impl Responder {
    match state.drafts.clear(&session_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => ServiceError::from(e).error_response(),
    }
}

/// A draft that no longer parses is treated as absent.
fn load_draft(state: &AppState, session_id: &str) -> Result<DataRow, ServiceError> {
    let Some(raw) = state.drafts.load(session_id, MANUAL_FORM_KEY)? else {
        return Ok(DataRow::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Discarding unreadable draft of session {}: {}", session_id, e);
        DataRow::new()
    }))
}
