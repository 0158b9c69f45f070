//! Export packaging: single artifacts and zip archives of a batch.
//!
//! Pure bytes-in, bytes-out; nothing here knows about placeholders or mappings.

use chrono::{DateTime, Utc};
use common::model::merge::{MergedDocument, RenderedContent};
use std::io::{Cursor, Write};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// A downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `document-{index+1}.{html|docx}`.
pub fn document_file_name(index: usize, content: &RenderedContent) -> String {
    format!("document-{}.{}", index + 1, content.kind().extension())
}

/// Packages the document at 0-based `index` on its own.
pub fn package_single(content: &RenderedContent, index: usize) -> NamedArtifact {
    NamedArtifact {
        file_name: document_file_name(index, content),
        content_type: content.kind().content_type(),
        bytes: content.as_bytes().to_vec(),
    }
}

/// Packages a whole batch into a zip stamped with the current time.
pub fn package_all(documents: &[MergedDocument]) -> ZipResult<NamedArtifact> {
    package_all_at(documents, Utc::now())
}

/// Packages a batch into `merged-documents-{millis}.zip`, one entry per
/// document, named by position in `documents`.
pub fn package_all_at(
    documents: &[MergedDocument],
    stamp: DateTime<Utc>,
) -> ZipResult<NamedArtifact> {
    let entries: Vec<(String, &[u8])> = documents
        .iter()
        .enumerate()
        .map(|(position, doc)| (document_file_name(position, &doc.content), doc.content.as_bytes()))
        .collect();

    Ok(NamedArtifact {
        file_name: format!("merged-documents-{}.zip", stamp.timestamp_millis()),
        content_type: ZIP_CONTENT_TYPE,
        bytes: build_archive(&entries)?,
    })
}

/// Writes (file name, bytes) pairs into one deflated zip archive.
pub fn build_archive<N: AsRef<str>>(entries: &[(N, &[u8])]) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer.start_file(name.as_ref(), options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}
