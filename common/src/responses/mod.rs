use crate::model::data_row::DataRow;
use crate::model::mapping::FieldMapping;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub mappings: Vec<FieldMapping>,
    pub complete: bool,
    pub unmapped: Vec<String>,
}

/// Returned after a dataset upload.
#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub dataset_id: String,
    pub field_names: Vec<String>,
    pub row_count: usize,
    pub preview: Vec<DataRow>,
}

#[derive(Debug, Serialize)]
pub struct StartMergeResponse {
    pub job_id: String,
}

/// Listing entry for one rendered document of a finished batch.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub index: usize,
    pub file_name: String,
    pub content_type: String,
    /// Rendered text, only for plain-text documents.
    pub preview: Option<String>,
    pub row: DataRow,
}
