pub mod data_row;
pub mod dataset;
pub mod mapping;
pub mod merge;
pub mod template;
