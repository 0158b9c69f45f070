use crate::model::data_row::DataRow;
use crate::model::template::TemplateKind;

/// The output of one row merge.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedContent {
    /// Rendered plain-text template, exported as HTML.
    Html(String),
    /// Rendered Word document bytes.
    Docx(Vec<u8>),
}

impl RenderedContent {
    pub fn kind(&self) -> TemplateKind {
        match self {
            RenderedContent::Html(_) => TemplateKind::Text,
            RenderedContent::Docx(_) => TemplateKind::Word,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RenderedContent::Html(text) => text.as_bytes(),
            RenderedContent::Docx(bytes) => bytes,
        }
    }
}

/// One rendered document of a batch.
///
/// Created once per (template, row, mapping) and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    /// `doc-{index}`, stable across re-runs of the same dataset.
    pub id: String,
    /// 0-based position of the source row in the dataset.
    pub index: usize,
    pub content: RenderedContent,
    /// The row this document was generated from.
    pub row: DataRow,
}

impl MergedDocument {
    pub fn new(index: usize, content: RenderedContent, row: DataRow) -> Self {
        Self {
            id: format!("doc-{}", index),
            index,
            content,
            row,
        }
    }
}
