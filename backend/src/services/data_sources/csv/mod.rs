//! CSV data source uploads.
//!
//! - `POST /api/data_sources/csv/upload`: multipart/form-data with a `file`
//!   part ending in `.csv`. The file is parsed into a dataset keyed by the MD5
//!   of its bytes, so uploading the same file twice yields the same id. The
//!   response carries the id, the field names, the row count and a preview of
//!   the first rows.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod upload;

const API_PATH: &str = "/api/data_sources/csv";

/// Configures and returns the Actix scope for CSV data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
