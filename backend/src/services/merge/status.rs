//! `GET /api/merge/status/{job_id}`: the current `JobStatus` of a merge job.

use crate::error::ServiceError;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// Actix web handler for `GET /api/merge/status/{job_id}`.
///
/// # Arguments
/// * `state` - The shared `JobsState`.
/// * `job_id` - The id returned by `POST /api/merge/start`, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the current `JobStatus`.
/// - `404 Not Found` for unknown or discarded jobs.
pub async fn process(state: web::Data<JobsState>, job_id: web::Path<String>) -> impl Responder {
    match state.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => ServiceError::NotFound(format!("job {}", job_id)).error_response(),
    }
}
