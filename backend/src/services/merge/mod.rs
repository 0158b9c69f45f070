//! Merge endpoints: batch jobs over an uploaded dataset, their documents, and
//! single-row manual merges.

mod documents;
mod manual;
mod start;
mod status;

use crate::error::{MergeError, ServiceError};
use crate::storage::TemplateStore;
use actix_web::web;
use common::model::template::{Template, TemplateKind};

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all merge-related routes.
///
/// *   **`POST /start`**: validates the request and starts a background job.
/// *   **`GET /status/{job_id}`**: current `JobStatus` of a job.
/// *   **`GET /{job_id}/documents`**: listing of a finished batch.
/// *   **`GET /{job_id}/documents/{index}`**: one document as a download.
/// *   **`GET /{job_id}/archive`**: the whole batch as a zip archive.
/// *   **`DELETE /{job_id}`**: discards a job and its documents.
/// *   **`POST /manual`**: renders one document from hand-entered values.
pub fn configure_routes() -> actix_web::Scope {
    web::scope(API_PATH)
        .route("/start", web::post().to(start::process))
        .route("/manual", web::post().to(manual::process))
        .route("/status/{job_id}", web::get().to(status::process))
        .route("/{job_id}/documents", web::get().to(documents::list))
        .route("/{job_id}/documents/{index}", web::get().to(documents::single))
        .route("/{job_id}/archive", web::get().to(documents::archive))
        .route("/{job_id}", web::delete().to(documents::discard))
}

/// Reads the stored document of a Word template; text templates have none.
pub(crate) fn load_document(
    store: &dyn TemplateStore,
    template: &Template,
) -> Result<Option<Vec<u8>>, ServiceError> {
    if template.kind() == TemplateKind::Text {
        return Ok(None);
    }
    let path = template
        .storage_path
        .as_deref()
        .ok_or(MergeError::MissingDocument)?;
    let bytes = store.fetch_binary(path)?.ok_or(MergeError::MissingDocument)?;
    Ok(Some(bytes))
}
