use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::info;

/// Actix web handler for `DELETE /api/data_sources/{dataset_id}`.
///
/// # Arguments
/// * `state` - The shared `AppState` holding the uploaded datasets.
/// * `dataset_id` - The MD5 id returned by the upload, extracted from the URL path.
///
/// # Returns
/// - `204 No Content` once the dataset is freed.
/// - `404 Not Found` if no dataset has that id.
pub async fn process(state: web::Data<AppState>, dataset_id: web::Path<String>) -> impl Responder {
    if state.remove_dataset(&dataset_id).await {
        info!("Dataset {} deleted", dataset_id);
        HttpResponse::NoContent().finish()
    } else {
        ServiceError::NotFound(format!("dataset {}", dataset_id)).error_response()
    }
}
