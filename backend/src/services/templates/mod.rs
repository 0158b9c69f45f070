//! # Template Service Module
//!
//! This module aggregates all API endpoints related to the management of templates.
//! It acts as a router, directing incoming HTTP requests under the `/api/templates`
//! path to the appropriate handler logic defined in its sub-modules.
//!
//! ## Sub-modules:
//! - `get`: Lists templates and retrieves a single template.
//! - `save`: Creates and updates templates, deriving their placeholder list.
//! - `rename`: Changes the display name of a template.
//! - `delete`: Removes a template together with its stored Word document.

mod delete;
pub(crate) mod get;
mod rename;
mod save;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: every template, most recently updated first.
///
/// *   **`POST /`**: saves a template sent as a JSON body. A Word template
///     carries its document as base64 in `word_document_base64`.
///
/// *   **`POST /save`**: saves a template sent as multipart form data: a `json`
///     part with the template fields and an optional `file` part holding the
///     `.docx` document.
///
/// *   **`GET /{template_id}`** and **`DELETE /{template_id}`**.
///
/// *   **`POST /{template_id}/rename`**: expects `{"name": "..."}`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("", post().to(save::process_json))
        .route("/save", post().to(save::process))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}", delete().to(delete::process))
        .route("/{template_id}/rename", post().to(rename::process))
}
