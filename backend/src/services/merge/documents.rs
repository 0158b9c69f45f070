//! Documents of a finished merge job.
//!
//! Every endpoint answers `404` for unknown jobs and `409` while the job is
//! still running or after it failed.

use crate::engine::package::{document_file_name, package_all, package_single};
use crate::error::{MergeError, ServiceError};
use crate::job_controller::state::{JobsState, MergeBatch};
use crate::services::artifact_response;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::model::merge::RenderedContent;
use common::responses::DocumentSummary;
use log::info;
use std::sync::Arc;

async fn finished_batch(jobs: &JobsState, job_id: &str) -> Result<Arc<MergeBatch>, ServiceError> {
    if let Some(batch) = jobs.results(job_id).await {
        return Ok(batch);
    }
    match jobs.status(job_id).await {
        None => Err(ServiceError::NotFound(format!("job {}", job_id))),
        Some(JobStatus::Failed(cause)) => {
            Err(ServiceError::Conflict(format!("job {} failed: {}", job_id, cause)))
        }
        Some(_) => Err(ServiceError::Conflict(format!("job {} has not finished yet", job_id))),
    }
}

/// `GET /api/merge/{job_id}/documents`
pub async fn list(jobs: web::Data<JobsState>, job_id: web::Path<String>) -> impl Responder {
    match finished_batch(&jobs, &job_id).await {
        Ok(batch) => HttpResponse::Ok().json(summaries(&batch)),
        Err(e) => e.error_response(),
    }
}

fn summaries(batch: &MergeBatch) -> Vec<DocumentSummary> {
    batch
        .documents
        .iter()
        .map(|doc| DocumentSummary {
            id: doc.id.clone(),
            index: doc.index,
            file_name: document_file_name(doc.index, &doc.content),
            content_type: doc.content.kind().content_type().to_string(),
            preview: match &doc.content {
                RenderedContent::Html(text) => Some(text.clone()),
                RenderedContent::Docx(_) => None,
            },
            row: doc.row.clone(),
        })
        .collect()
}

/// `GET /api/merge/{job_id}/documents/{index}`, with a 0-based index.
pub async fn single(
    jobs: web::Data<JobsState>,
    path: web::Path<(String, usize)>,
) -> impl Responder {
    let (job_id, index) = path.into_inner();
    let result = finished_batch(&jobs, &job_id).await.and_then(|batch| {
        batch
            .documents
            .get(index)
            .map(|doc| package_single(&doc.content, doc.index))
            .ok_or_else(|| ServiceError::NotFound(format!("document {} of job {}", index, job_id)))
    });
    match result {
        Ok(artifact) => artifact_response(artifact),
        Err(e) => e.error_response(),
    }
}

/// `GET /api/merge/{job_id}/archive`
pub async fn archive(jobs: web::Data<JobsState>, job_id: web::Path<String>) -> impl Responder {
    let result = async {
        let batch = finished_batch(&jobs, &job_id).await?;
        let artifact = web::block(move || package_all(&batch.documents))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
            .map_err(MergeError::from)?;
        info!("Job {}: packaged {} as {}", job_id, artifact.content_type, artifact.file_name);
        Ok::<_, ServiceError>(artifact)
    }
    .await;
    match result {
        Ok(artifact) => artifact_response(artifact),
        Err(e) => e.error_response(),
    }
}

/// `DELETE /api/merge/{job_id}`: forgets the job. A job still running keeps
/// running but its documents are dropped when it finishes.
pub async fn discard(jobs: web::Data<JobsState>, job_id: web::Path<String>) -> impl Responder {
    if jobs.discard(&job_id).await {
        info!("Job {} discarded", job_id);
        HttpResponse::NoContent().finish()
    } else {
        ServiceError::NotFound(format!("job {}", job_id)).error_response()
    }
}
