use crate::model::data_row::DataRow;
use serde::{Deserialize, Serialize};

/// An ordered collection of rows sharing one field-name vocabulary.
///
/// Row order drives output order and document naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// MD5 of the uploaded source bytes.
    pub id: String,
    /// Field names in source column order.
    pub field_names: Vec<String>,
    pub rows: Vec<DataRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `limit` rows, for display.
    pub fn preview(&self, limit: usize) -> &[DataRow] {
        &self.rows[..self.rows.len().min(limit)]
    }
}
