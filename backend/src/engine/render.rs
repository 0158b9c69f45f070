//! Row merge: one data row plus a complete mapping produces one document.

use crate::engine::docx::{DocxError, DocxTemplate};
use crate::engine::extract::{extract_text_placeholders, text_placeholder_pattern};
use crate::error::MergeError;
use common::model::data_row::DataRow;
use common::model::mapping::FieldMapping;
use common::model::merge::RenderedContent;
use common::model::template::{Template, TemplateKind};
use regex::Captures;
use std::collections::HashMap;

/// Flat placeholder → value table for one row. Missing values are empty strings.
pub fn value_table(row: &DataRow, mappings: &[FieldMapping]) -> HashMap<String, String> {
    mappings
        .iter()
        .map(|m| (m.placeholder.clone(), row.substitution(&m.data_field)))
        .collect()
}

/// Substitutes every `{{placeholder}}` of a text template in a single scan.
///
/// Whitespace inside the braces is ignored. Substituted values are never
/// scanned again, so a value that itself looks like a placeholder is kept
/// verbatim. Values are inserted without HTML escaping.
pub fn merge_text(content: &str, row: &DataRow, mappings: &[FieldMapping]) -> String {
    let table = value_table(row, mappings);
    text_placeholder_pattern()
        .replace_all(content, |caps: &Captures| match table.get(caps[1].trim()) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Renders one row of a Word template in a single pass over the loaded package.
pub fn merge_word(
    template: &DocxTemplate,
    row: &DataRow,
    mappings: &[FieldMapping],
) -> Result<Vec<u8>, DocxError> {
    template.render(&value_table(row, mappings))
}

enum TemplateBody {
    Text(String),
    Word(DocxTemplate),
}

/// A template ready for merging: text content, or a Word package loaded once.
pub struct LoadedTemplate {
    placeholders: Vec<String>,
    body: TemplateBody,
}

impl LoadedTemplate {
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            placeholders: extract_text_placeholders(&content),
            body: TemplateBody::Text(content),
        }
    }

    pub fn word(document: DocxTemplate) -> Result<Self, DocxError> {
        Ok(Self {
            placeholders: document.placeholders()?,
            body: TemplateBody::Word(document),
        })
    }

    /// Loads a stored template. Word templates need their document bytes.
    pub fn from_template(template: &Template, document: Option<&[u8]>) -> Result<Self, MergeError> {
        match template.kind() {
            TemplateKind::Text => Ok(Self::text(template.content.as_str())),
            TemplateKind::Word => {
                let bytes = document.ok_or(MergeError::MissingDocument)?;
                Ok(Self::word(DocxTemplate::load(bytes)?)?)
            }
        }
    }

    pub fn kind(&self) -> TemplateKind {
        match self.body {
            TemplateBody::Text(_) => TemplateKind::Text,
            TemplateBody::Word(_) => TemplateKind::Word,
        }
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Renders one row. Only Word templates can fail.
    pub fn merge_row(
        &self,
        row: &DataRow,
        mappings: &[FieldMapping],
    ) -> Result<RenderedContent, DocxError> {
        match &self.body {
            TemplateBody::Text(content) => {
                Ok(RenderedContent::Html(merge_text(content, row, mappings)))
            }
            TemplateBody::Word(document) => {
                Ok(RenderedContent::Docx(merge_word(document, row, mappings)?))
            }
        }
    }
}
