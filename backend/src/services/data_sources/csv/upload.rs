use crate::error::ServiceError;
use crate::ingest::csv::parse_dataset;
use crate::services::data_sources::summarize;
use crate::services::multipart::read_form;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::responses::DatasetSummary;
use log::{info, warn};

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: `200 OK` with a `DatasetSummary`.
/// - On failure: `400 Bad Request` for unreadable uploads or CSV content.
pub async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match upload_dataset(&state, payload).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            warn!("CSV upload rejected: {}", e);
            e.error_response()
        }
    }
}

async fn upload_dataset(
    state: &AppState,
    payload: Multipart,
) -> Result<DatasetSummary, ServiceError> {
    let form = read_form(payload).await?;
    form.file_with_extension(".csv")?;
    let file = form
        .file
        .ok_or_else(|| ServiceError::Upload("missing 'file' part".to_string()))?;

    let file_name = file.file_name;
    let bytes = file.bytes;
    let dataset = web::block(move || parse_dataset(&bytes))
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;

    info!(
        "Parsed '{}' into dataset {} ({} rows, {} fields)",
        file_name,
        dataset.id,
        dataset.len(),
        dataset.field_names.len()
    );
    let dataset = state.insert_dataset(dataset).await;
    Ok(summarize(&dataset, state.config.preview_rows))
}
