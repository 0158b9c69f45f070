//! Manages the state of long-running background merge jobs.
//!
//! - `JobsState`: a clonable, thread-safe struct holding every job's status
//!   and the documents of finished batches. It is injected into the Actix
//!   application state in `main.rs`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: a long-running task that applies `JobUpdate`s to the
//!   shared status map.
//!
//! Discarding a job removes its status and results. Updates or results that
//! arrive for a discarded job are dropped, which is how in-flight batches are
//! abandoned.

use common::jobs::JobStatus;
use common::model::merge::MergedDocument;
use common::model::template::TemplateKind;
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// The documents of one finished merge job.
#[derive(Debug)]
pub struct MergeBatch {
    pub kind: TemplateKind,
    pub documents: Vec<MergedDocument>,
}

#[derive(Clone)]
pub struct JobsState {
    /// Job id → current status. Read by the status endpoint, written by the updater.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Job id → rendered batch, present once the job has completed.
    pub results: Arc<RwLock<HashMap<String, Arc<MergeBatch>>>>,

    /// Sender side of the updater channel; background jobs report through it.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Creates the state together with the receiver to hand to `start_job_updater`.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            results: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Stores a finished batch unless the job was discarded meanwhile.
    ///
    /// The status map stays read-locked until the batch is inserted, so a
    /// concurrent `discard` either runs first or also removes the batch.
    pub async fn store_results(&self, job_id: &str, batch: MergeBatch) -> bool {
        let jobs = self.jobs.read().await;
        if !jobs.contains_key(job_id) {
            debug!("Dropping results of discarded job {}", job_id);
            return false;
        }
        self.results
            .write()
            .await
            .insert(job_id.to_string(), Arc::new(batch));
        drop(jobs);
        true
    }

    pub async fn results(&self, job_id: &str) -> Option<Arc<MergeBatch>> {
        self.results.read().await.get(job_id).cloned()
    }

    /// Forgets the job and its results. Returns whether the job existed.
    pub async fn discard(&self, job_id: &str) -> bool {
        let existed = self.jobs.write().await.remove(job_id).is_some();
        self.results.write().await.remove(job_id);
        existed
    }
}

/// Applies job updates from `rx` to the shared status map until every sender
/// is dropped. Updates for unknown (discarded) jobs are ignored.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if let Some(status) = jobs.get_mut(&update.job_id) {
            *status = update.status;
        }
    }
}
