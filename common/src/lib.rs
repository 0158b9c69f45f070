//! Data model shared by the merge engine, the storage layer and the HTTP services.

pub mod jobs;
pub mod model;
pub mod requests;
pub mod responses;
