//! Document merge server: templates with named placeholders, bound to the
//! columns of a dataset, rendered once per row.

pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod job_controller;
pub mod services;
pub mod state;
pub mod storage;
