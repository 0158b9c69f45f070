//! HTTP surface of the merge server.
//!
//! Every sub-module exposes a `configure_routes` returning its Actix `Scope`;
//! [`configure`] mounts them all on an application.

pub mod data_sources;
pub mod drafts;
pub mod mapping;
pub mod merge;
mod multipart;
pub mod templates;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use crate::engine::package::NamedArtifact;

/// Registers every API scope.
///
/// The CSV upload scope is registered before the generic data source scope
/// so `/api/data_sources/csv/...` is not captured as a dataset id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(templates::configure_routes())
        .service(data_sources::csv::configure_routes())
        .service(data_sources::configure_routes())
        .service(mapping::configure_routes())
        .service(merge::configure_routes())
        .service(drafts::configure_routes());
}

/// Serves a document or archive as a download.
pub(crate) fn artifact_response(artifact: NamedArtifact) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(artifact.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.file_name)],
        })
        .body(artifact.bytes)
}
