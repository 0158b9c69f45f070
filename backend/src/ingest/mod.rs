//! Tabular ingestion: turning uploaded files into datasets.

pub mod csv;
