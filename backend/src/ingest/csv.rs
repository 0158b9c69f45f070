//! CSV ingestion.
//!
//! The first line is the header. The delimiter is whichever of `, ; \t |`
//! occurs most in the header line. Every cell is kept as text; rows shorter
//! than the header leave their trailing fields absent and blank lines are
//! skipped.

use crate::error::IngestError;
use common::model::data_row::{DataRow, FieldValue};
use common::model::dataset::Dataset;
use csv::{ReaderBuilder, Trim};
use log::debug;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Picks the most frequent candidate delimiter of the header line, preferring
/// the earlier candidate on ties and `,` when none occurs.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0);
    for candidate in CANDIDATE_DELIMITERS {
        let count = header_line.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parses CSV bytes into a dataset whose id is the MD5 of `bytes`.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, IngestError> {
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let header_end = content
        .iter()
        .position(|b| *b == b'\n')
        .unwrap_or(content.len());
    let header_line = String::from_utf8_lossy(&content[..header_end]);
    let delimiter = detect_delimiter(&header_line);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content);

    let field_names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if field_names.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: DataRow = field_names
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.as_str(), FieldValue::from(cell)))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(IngestError::Empty);
    }

    let id = format!("{:x}", md5::compute(bytes));
    debug!(
        "Parsed dataset {} ({} rows, delimiter {:?})",
        id,
        rows.len(),
        delimiter as char
    );
    Ok(Dataset {
        id,
        field_names,
        rows,
    })
}
