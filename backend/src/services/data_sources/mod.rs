//! Data sources: tabular uploads turned into in-memory datasets.
//!
//! - `csv`: `POST /api/data_sources/csv/upload`.
//! - `GET /api/data_sources/{dataset_id}`: summary of an uploaded dataset.
//! - `DELETE /api/data_sources/{dataset_id}`: frees an uploaded dataset. Jobs
//!   already started keep their own reference to it.

pub mod csv;
mod delete;
mod get;

use actix_web::web::{delete, get, scope};
use actix_web::Scope;
use common::model::dataset::Dataset;
use common::responses::DatasetSummary;

const API_PATH: &str = "/api/data_sources";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{dataset_id}", get().to(get::process))
        .route("/{dataset_id}", delete().to(delete::process))
}

/// Field names, row count and the first `preview_rows` rows of `dataset`.
pub(crate) fn summarize(dataset: &Dataset, preview_rows: usize) -> DatasetSummary {
    DatasetSummary {
        dataset_id: dataset.id.clone(),
        field_names: dataset.field_names.clone(),
        row_count: dataset.len(),
        preview: dataset.preview(preview_rows).to_vec(),
    }
}
