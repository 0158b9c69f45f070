//! # Merge Job Start Service
//!
//! This module provides the `POST /api/merge/start` endpoint, which merges an
//! uploaded dataset into a stored template, one document per row.
//!
//! ## Workflow:
//!
//! 1.  **Validation**: The template and dataset are looked up and the mapping
//!     is checked against the template's placeholders. Empty datasets,
//!     templates without placeholders and incomplete mappings are rejected
//!     with `422` before any job exists.
//!
//! 2.  **Job Scheduling**: A `job_id` is registered as `Pending` in the shared
//!     `JobsState` and returned to the client immediately.
//!
//! 3.  **Background Processing**: A Tokio task runs `merge_blocking` through
//!     `spawn_blocking`. It loads the template once (reading a Word document
//!     from storage a single time) and renders every row on the rayon pool.
//!
//! 4.  **Progress Reporting**: The worker sends `MergeUpdate`s to a listener
//!     task that turns them into `InProgress(percent)` job updates.
//!
//! 5.  **Completion**: The rendered batch is stored in `JobsState` before the
//!     job is marked `Completed`, so a client that sees the final status can
//!     fetch the documents. A failing row marks the job `Failed` and keeps
//!     no documents.

use crate::engine::batch::{check_preconditions, merge_all_with_progress};
use crate::engine::render::LoadedTemplate;
use crate::error::ServiceError;
use crate::job_controller::state::{JobUpdate, JobsState, MergeBatch};
use crate::services::merge::load_document;
use crate::services::templates::get::get_template;
use crate::state::AppState;
use crate::storage::TemplateStore;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::model::dataset::Dataset;
use common::model::mapping::FieldMapping;
use common::model::template::Template;
use common::requests::StartMergeRequest;
use common::responses::StartMergeResponse;
use log::{error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress sent from the blocking worker back to the async side of a job.
#[derive(Debug)]
pub enum MergeUpdate {
    /// Replaces the status of the whole job.
    Job(JobStatus),
    /// `completed` of `total_rows` rows have rendered.
    Task { completed: usize, total_rows: usize },
}

/// The Actix web handler for `POST /api/merge/start`.
pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    state: web::Data<AppState>,
    payload: web::Json<StartMergeRequest>,
) -> impl Responder {
    match schedule_merge_job(&jobs, &state, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(StartMergeResponse { job_id }),
        Err(err) => {
            warn!("Merge request rejected: {}", err);
            err.error_response()
        }
    }
}

async fn schedule_merge_job(
    jobs: &JobsState,
    state: &AppState,
    req: StartMergeRequest,
) -> Result<String, ServiceError> {
    let template = get_template(state, &req.template_id)?;
    let dataset = state
        .dataset(&req.dataset_id)
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("dataset {}", req.dataset_id)))?;
    check_preconditions(&template.placeholders, &dataset, &req.mappings)?;

    let job_id = Uuid::new_v4().to_string();
    jobs.register(&job_id).await;
    info!(
        "Job {}: merging {} rows into template {}",
        job_id,
        dataset.len(),
        template.id
    );

    let jobs = jobs.clone();
    let store = state.templates.clone();
    let job_id_clone = job_id.clone();
    let mappings = req.mappings;

    tokio::spawn(async move {
        let (merge_tx, mut merge_rx) = mpsc::channel::<MergeUpdate>(100);

        let job_updater_tx = jobs.tx.clone();
        let job_id_for_updater = job_id_clone.clone();
        let listener = tokio::spawn(async move {
            while let Some(update) = merge_rx.recv().await {
                let status = match update {
                    MergeUpdate::Job(job_status) => job_status,
                    MergeUpdate::Task {
                        completed,
                        total_rows,
                    } => JobStatus::InProgress(progress_percent(completed, total_rows)),
                };
                let _ = job_updater_tx
                    .send(JobUpdate {
                        job_id: job_id_for_updater.clone(),
                        status,
                    })
                    .await;
            }
        });

        let handle = tokio::task::spawn_blocking(move || {
            merge_blocking(merge_tx, store.as_ref(), &template, &dataset, &mappings)
        });
        let outcome = handle.await;
        // The worker dropped its sender; wait until its last progress update
        // is forwarded so it cannot overwrite the final status.
        let _ = listener.await;

        let status = match outcome {
            Ok(Ok(batch)) => {
                let count = batch.documents.len();
                if jobs.store_results(&job_id_clone, batch).await {
                    info!("Job {}: {} documents ready", job_id_clone, count);
                }
                JobStatus::Completed(format!("Generated {} documents", count))
            }
            Ok(Err(e)) => {
                error!("Job {} failed: {}", job_id_clone, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = jobs
            .tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    Ok(job_id)
}

/// Renders the whole batch. Runs on a blocking thread.
fn merge_blocking(
    tx: mpsc::Sender<MergeUpdate>,
    store: &dyn TemplateStore,
    template: &Template,
    dataset: &Dataset,
    mappings: &[FieldMapping],
) -> Result<MergeBatch, ServiceError> {
    let _ = tx.blocking_send(MergeUpdate::Job(JobStatus::InProgress(0)));

    let document = load_document(store, template)?;
    let loaded = LoadedTemplate::from_template(template, document.as_deref())?;

    let total_rows = dataset.len();
    let completed = AtomicUsize::new(0);
    let documents = merge_all_with_progress(&loaded, dataset, mappings, |_| {
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = tx.blocking_send(MergeUpdate::Task {
            completed: done,
            total_rows,
        });
    })?;

    Ok(MergeBatch {
        kind: loaded.kind(),
        documents,
    })
}

fn progress_percent(completed: usize, total_rows: usize) -> u32 {
    if total_rows == 0 {
        return 0;
    }
    (completed.min(total_rows) * 100 / total_rows) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_a_whole_percentage() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }
}
