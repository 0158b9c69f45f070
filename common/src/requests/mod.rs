use crate::model::data_row::DataRow;
use crate::model::mapping::FieldMapping;
use serde::Deserialize;

/// Payload for creating or updating a template.
///
/// Word templates carry their document either as a separate multipart `file`
/// part or inline as base64.
#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    /// Absent when creating a new template.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_word_template: bool,
    #[serde(default)]
    pub word_document_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameTemplateRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AutoMapRequest {
    pub placeholders: Vec<String>,
    pub data_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetMappingRequest {
    pub placeholders: Vec<String>,
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
    pub placeholder: String,
    pub data_field: String,
}

/// Request payload for `POST /api/merge/start`.
#[derive(Debug, Deserialize)]
pub struct StartMergeRequest {
    pub template_id: String,
    pub dataset_id: String,
    pub mappings: Vec<FieldMapping>,
}

/// Request payload for `POST /api/merge/manual`.
#[derive(Debug, Deserialize)]
pub struct ManualMergeRequest {
    pub template_id: String,
    /// Draft scope to clear once the document has been produced.
    #[serde(default)]
    pub session_id: Option<String>,
    pub values: DataRow,
}
