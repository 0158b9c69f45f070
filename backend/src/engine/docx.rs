//! Word (OOXML) template rendering.
//!
//! A `.docx` file is a zip package whose text lives in `<w:t>` elements of
//! `word/document.xml` (plus header and footer parts). Word freely splits a
//! typed `{Name}` over several runs, so tags are recognised on the
//! concatenated run text and the substituted value is written back into the
//! run where the tag opens. Runs consumed by a tag are emptied.

use crate::engine::extract::extract_word_placeholders;
use quick_xml::escape::{escape, unescape};
use regex::Regex;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// A `<w:t>` element with its text content in group 1.
static TEXT_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("valid text run pattern")
});

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a valid OOXML package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error while reading the package: {0}")]
    Io(#[from] std::io::Error),

    #[error("part '{0}' is missing from the package")]
    MissingPart(String),

    #[error("part '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("invalid XML text in part '{part}': {message}")]
    Xml { part: String, message: String },

    #[error("unclosed tag '{{{tag}' in part '{part}'")]
    UnclosedTag { part: String, tag: String },

    #[error("closing brace without an opening tag after '{context}' in part '{part}'")]
    UnopenedTag { part: String, context: String },

    #[error("tag '{{{tag}' opens another tag in part '{part}'")]
    NestedTag { part: String, tag: String },
}

struct PackageEntry {
    name: String,
    compression: CompressionMethod,
    data: Vec<u8>,
}

/// Declared sizes come from the uploaded archive and are not trusted.
fn preallocation(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

/// A Word template loaded once and rendered any number of times.
///
/// Rendering only reads the loaded entries, so one instance can be shared by
/// concurrent row renders.
pub struct DocxTemplate {
    entries: Vec<PackageEntry>,
}

impl DocxTemplate {
    /// Opens the package and keeps every entry in memory.
    pub fn load(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(preallocation(file.size()));
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                compression: file.compression(),
                data,
            });
        }

        if !entries.iter().any(|e| e.name == DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(Self { entries })
    }

    /// The document body text with paragraph and line-break structure removed.
    pub fn full_text(&self) -> Result<String, DocxError> {
        let xml = self.part_xml(DOCUMENT_PART)?;
        let mut text = String::new();
        for caps in TEXT_RUN.captures_iter(xml) {
            text.push_str(&unescape_text(DOCUMENT_PART, &caps[1])?);
        }
        Ok(text)
    }

    /// Distinct `{name}` placeholders of the document body.
    pub fn placeholders(&self) -> Result<Vec<String>, DocxError> {
        Ok(extract_word_placeholders(&self.full_text()?))
    }

    /// Renders the template with `values` and returns the new package bytes.
    ///
    /// Tags whose name is not in `values` render as an empty string.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<Vec<u8>, DocxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.name.ends_with('/') {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            writer.start_file(entry.name.as_str(), options)?;
            if is_templated_part(&entry.name) {
                let xml = std::str::from_utf8(&entry.data)
                    .map_err(|_| DocxError::Encoding(entry.name.clone()))?;
                writer.write_all(render_part(&entry.name, xml, values)?.as_bytes())?;
            } else {
                writer.write_all(&entry.data)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    fn part_xml(&self, name: &str) -> Result<&str, DocxError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        std::str::from_utf8(&entry.data).map_err(|_| DocxError::Encoding(name.to_string()))
    }
}

fn is_templated_part(name: &str) -> bool {
    name == DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

fn unescape_text(part: &str, raw: &str) -> Result<String, DocxError> {
    unescape(raw)
        .map(|text| text.into_owned())
        .map_err(|e| DocxError::Xml {
            part: part.to_string(),
            message: e.to_string(),
        })
}

fn render_part(
    part: &str,
    xml: &str,
    values: &HashMap<String, String>,
) -> Result<String, DocxError> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    for caps in TEXT_RUN.captures_iter(xml) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            ranges.push(whole.range());
            texts.push(unescape_text(part, inner.as_str())?);
        }
    }
    if ranges.is_empty() {
        return Ok(xml.to_string());
    }

    let rendered = substitute_tags(part, &texts, values)?;

    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for ((range, original), new_text) in ranges.iter().zip(&texts).zip(&rendered) {
        out.push_str(&xml[last..range.start]);
        if new_text == original {
            out.push_str(&xml[range.clone()]);
        } else {
            push_text_run(&mut out, new_text);
        }
        last = range.end;
    }
    out.push_str(&xml[last..]);
    Ok(out)
}

struct OpenTag {
    run: usize,
    name: String,
}

/// Replaces `{name}` tags across the run texts of one part.
fn substitute_tags(
    part: &str,
    texts: &[String],
    values: &HashMap<String, String>,
) -> Result<Vec<String>, DocxError> {
    let mut out = vec![String::new(); texts.len()];
    let mut open: Option<OpenTag> = None;

    for (run, text) in texts.iter().enumerate() {
        for ch in text.chars() {
            match open.take() {
                None => match ch {
                    '{' => {
                        open = Some(OpenTag {
                            run,
                            name: String::new(),
                        })
                    }
                    '}' => {
                        return Err(DocxError::UnopenedTag {
                            part: part.to_string(),
                            context: out[run].clone(),
                        })
                    }
                    _ => out[run].push(ch),
                },
                Some(mut tag) => match ch {
                    '{' => {
                        return Err(DocxError::NestedTag {
                            part: part.to_string(),
                            tag: tag.name,
                        })
                    }
                    '}' => {
                        let value = values.get(tag.name.trim()).map(String::as_str).unwrap_or("");
                        out[tag.run].push_str(value);
                    }
                    _ => {
                        tag.name.push(ch);
                        open = Some(tag);
                    }
                },
            }
        }
    }

    if let Some(tag) = open {
        return Err(DocxError::UnclosedTag {
            part: part.to_string(),
            tag: tag.name,
        });
    }
    Ok(out)
}

/// Writes `text` as one or more `<w:t>` elements; newlines become `<w:br/>`.
fn push_text_run(out: &mut String, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        out.push_str(r#"<w:t xml:space="preserve">"#);
        out.push_str(&escape(line));
        out.push_str("</w:t>");
    }
}
