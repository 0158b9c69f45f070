//! The template merge engine.
//!
//! - `extract`: placeholder discovery for text (`{{x}}`) and Word (`{x}`) templates.
//! - `mapping`: automatic and manual placeholder → data field binding.
//! - `render`: merging one row into one document.
//! - `docx`: the Word package renderer used by `render`.
//! - `batch`: merging a whole dataset, one document per row.
//! - `package`: naming and zipping rendered documents for export.

pub mod batch;
pub mod docx;
pub mod extract;
pub mod mapping;
pub mod package;
pub mod render;
