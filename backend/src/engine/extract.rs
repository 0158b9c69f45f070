//! Placeholder discovery.
//!
//! Text templates delimit placeholders with double braces (`{{Name}}`), Word
//! templates with single braces (`{Name}`). The two conventions are kept as
//! separate extractors and are never applied to the other template kind.

use common::model::template::TemplateKind;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `{{name}}`. Non-greedy on `}}` so adjacent placeholders never merge.
static TEXT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid text placeholder pattern"));

/// `{name}` in the flattened text of a Word document.
static WORD_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("valid word placeholder pattern"));

/// The pattern shared by text extraction and text rendering, so both agree on
/// what a placeholder occurrence is.
pub(crate) fn text_placeholder_pattern() -> &'static Regex {
    &TEXT_PLACEHOLDER
}

/// Distinct placeholder names of a text template, in order of first appearance.
pub fn extract_text_placeholders(content: &str) -> Vec<String> {
    distinct_names(&TEXT_PLACEHOLDER, content)
}

/// Distinct placeholder names in the flattened text of a Word document.
pub fn extract_word_placeholders(flattened_text: &str) -> Vec<String> {
    distinct_names(&WORD_PLACEHOLDER, flattened_text)
}

/// Picks the extractor matching the template kind.
pub fn extract(kind: TemplateKind, text: &str) -> Vec<String> {
    match kind {
        TemplateKind::Text => extract_text_placeholders(text),
        TemplateKind::Word => extract_word_placeholders(text),
    }
}

fn distinct_names(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
