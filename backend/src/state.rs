//! Application state shared by the HTTP services.

use crate::config::AppConfig;
use crate::storage::sqlite::{SqliteDraftStore, SqliteTemplateStore};
use crate::storage::{DraftStore, TemplateStore};
use common::model::dataset::Dataset;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub templates: Arc<dyn TemplateStore>,
    pub drafts: Arc<dyn DraftStore>,
    /// Uploaded datasets by content hash, held until deleted.
    pub datasets: Arc<RwLock<HashMap<String, Arc<Dataset>>>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        templates: Arc<dyn TemplateStore>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            templates,
            drafts,
            datasets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// State backed by the SQLite stores named in `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let templates = Arc::new(SqliteTemplateStore::new(
            config.database_path.clone(),
            config.storage_dir.clone(),
        ));
        let drafts = Arc::new(SqliteDraftStore::new(config.database_path.clone()));
        Self::new(config, templates, drafts)
    }

    pub async fn dataset(&self, id: &str) -> Option<Arc<Dataset>> {
        self.datasets.read().await.get(id).cloned()
    }

    pub async fn insert_dataset(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        self.datasets
            .write()
            .await
            .insert(dataset.id.clone(), dataset.clone());
        dataset
    }

    /// Forgets an uploaded dataset. Returns whether it was present.
    pub async fn remove_dataset(&self, id: &str) -> bool {
        self.datasets.write().await.remove(id).is_some()
    }
}
