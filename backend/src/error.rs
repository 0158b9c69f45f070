//! Error types shared across the backend.

use crate::engine::docx::DocxError;
use crate::engine::mapping::MappingGaps;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Why a merge could not produce its documents.
///
/// Missing field values are not errors; they substitute as empty strings.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("the dataset has no rows")]
    EmptyDataset,

    #[error("the template has no placeholders")]
    NoPlaceholders,

    #[error("incomplete field mapping: {0}")]
    IncompleteMapping(MappingGaps),

    #[error("the Word template has no stored document")]
    MissingDocument,

    #[error("invalid Word template: {0}")]
    Template(#[from] DocxError),

    #[error("failed to render row {}: {source}", .index + 1)]
    Row {
        index: usize,
        #[source]
        source: DocxError,
    },

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt stored placeholders: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("invalid storage path '{0}'")]
    InvalidPath(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("error parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("the CSV file has no header row")]
    MissingHeader,

    #[error("the CSV file appears to be empty")]
    Empty,
}

/// Errors surfaced by the HTTP services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("invalid Word document: {0}")]
    Document(#[from] DocxError),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Invalid(_)
            | ServiceError::Ingest(_)
            | ServiceError::Document(_)
            | ServiceError::Upload(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Merge(
                MergeError::EmptyDataset
                | MergeError::NoPlaceholders
                | MergeError::IncompleteMapping(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Merge(_) | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(format!("Error: {}", self))
    }
}
