//! Batch merge: one rendered document per dataset row, in row order.
//!
//! Rows share nothing mutable, so they render in parallel on the rayon pool.
//! Results are collected by index, and the first failing row aborts the whole
//! batch; no partial output is ever returned.

use crate::engine::docx::DocxTemplate;
use crate::engine::mapping;
use crate::engine::render::{merge_word, LoadedTemplate};
use crate::error::MergeError;
use common::model::dataset::Dataset;
use common::model::mapping::FieldMapping;
use common::model::merge::MergedDocument;
use log::{debug, info, warn};
use rayon::prelude::*;

/// Rejects inputs that cannot produce a batch, before any rendering happens.
pub fn check_preconditions(
    placeholders: &[String],
    dataset: &Dataset,
    mappings: &[FieldMapping],
) -> Result<(), MergeError> {
    if dataset.is_empty() {
        return Err(MergeError::EmptyDataset);
    }
    if placeholders.is_empty() {
        return Err(MergeError::NoPlaceholders);
    }
    mapping::validate(placeholders, mappings).map_err(MergeError::IncompleteMapping)
}

pub fn merge_all(
    template: &LoadedTemplate,
    dataset: &Dataset,
    mappings: &[FieldMapping],
) -> Result<Vec<MergedDocument>, MergeError> {
    merge_all_with_progress(template, dataset, mappings, |_| {})
}

/// Like [`merge_all`], calling `on_row` with the row index after each row
/// renders. Calls arrive in completion order, not row order.
pub fn merge_all_with_progress<F>(
    template: &LoadedTemplate,
    dataset: &Dataset,
    mappings: &[FieldMapping],
    on_row: F,
) -> Result<Vec<MergedDocument>, MergeError>
where
    F: Fn(usize) + Sync,
{
    check_preconditions(template.placeholders(), dataset, mappings)?;
    info!(
        "Merging {} rows into a {:?} template ({} placeholders)",
        dataset.len(),
        template.kind(),
        template.placeholders().len()
    );

    let documents = dataset
        .rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| {
            let content = template.merge_row(row, mappings).map_err(|source| {
                warn!("Row {} failed to render: {}", index + 1, source);
                MergeError::Row { index, source }
            })?;
            debug!("Row {} rendered", index + 1);
            on_row(index);
            Ok(MergedDocument::new(index, content, row.clone()))
        })
        .collect::<Result<Vec<_>, MergeError>>()?;

    info!("Merged {} documents", documents.len());
    Ok(documents)
}

/// Renders every row of an already loaded Word template to document bytes.
pub fn merge_all_word(
    template: &DocxTemplate,
    dataset: &Dataset,
    mappings: &[FieldMapping],
) -> Result<Vec<Vec<u8>>, MergeError> {
    check_preconditions(&template.placeholders()?, dataset, mappings)?;
    dataset
        .rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| {
            merge_word(template, row, mappings).map_err(|source| MergeError::Row { index, source })
        })
        .collect()
}
