use crate::error::ServiceError;
use crate::services::data_sources::summarize;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// Actix web handler for `GET /api/data_sources/{dataset_id}`.
pub async fn process(state: web::Data<AppState>, dataset_id: web::Path<String>) -> impl Responder {
    match state.dataset(&dataset_id).await {
        Some(dataset) => HttpResponse::Ok().json(summarize(&dataset, state.config.preview_rows)),
        None => ServiceError::NotFound(format!("dataset {}", dataset_id)).error_response(),
    }
}
