//! Field mapping endpoints.
//!
//! Both return a `MappingResponse`: the mapping, whether it covers every
//! placeholder exactly once, and the placeholders still unmapped. A template
//! without placeholders is never reported complete, since there is nothing to
//! merge.

mod resolve;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/mapping";

/// *   **`POST /auto`**: proposes a mapping by case-insensitive name match.
/// *   **`POST /set`**: binds one placeholder to a data field, replacing any
///     previous binding of that placeholder.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/auto", post().to(resolve::auto))
        .route("/set", post().to(resolve::set))
}
