use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of rendered Word documents.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of rendered plain-text documents.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A reusable document template with named placeholders.
///
/// `placeholders` is derived from `content` (text templates) or from the stored
/// Word document (Word templates) every time the template is saved. It is a
/// cached value and is never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String, // UUID
    pub name: String,
    /// Raw template text. Empty for Word templates.
    #[serde(default)]
    pub content: String,
    /// Distinct placeholder names in order of first appearance.
    #[serde(default)]
    pub placeholders: Vec<String>,
    #[serde(default)]
    pub is_word_template: bool,
    /// Reference to the stored Word document, if any.
    #[serde(default)]
    pub storage_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn kind(&self) -> TemplateKind {
        if self.is_word_template {
            TemplateKind::Word
        } else {
            TemplateKind::Text
        }
    }
}

/// The two template flavours. Each one has its own placeholder delimiter:
/// `{{name}}` for text templates and `{name}` for Word templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateKind {
    Text,
    Word,
}

impl TemplateKind {
    /// File extension used when exporting documents of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            TemplateKind::Text => "html",
            TemplateKind::Word => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            TemplateKind::Text => HTML_CONTENT_TYPE,
            TemplateKind::Word => DOCX_CONTENT_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_word_flag() {
        let now = Utc::now();
        let mut template = Template {
            id: "t1".into(),
            name: "Letter".into(),
            content: "Hi {{Name}}".into(),
            placeholders: vec!["Name".into()],
            is_word_template: false,
            storage_path: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(template.kind(), TemplateKind::Text);
        assert_eq!(template.kind().extension(), "html");

        template.is_word_template = true;
        assert_eq!(template.kind(), TemplateKind::Word);
        assert_eq!(template.kind().extension(), "docx");
    }
}
