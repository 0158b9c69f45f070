use crate::engine::mapping::{auto_map, is_complete, set_mapping, unmapped};
use actix_web::{web, HttpResponse, Responder};
use common::model::mapping::FieldMapping;
use common::requests::{AutoMapRequest, SetMappingRequest};
use common::responses::MappingResponse;

/// Actix web handler for `POST /api/mapping/auto`.
///
/// # Arguments
/// * `payload` - The template's placeholders and the dataset's field names.
///
/// # Returns
/// `200 OK` with a `MappingResponse` binding every placeholder whose name
/// matches a field case-insensitively; the rest are listed as unmapped.
pub async fn auto(payload: web::Json<AutoMapRequest>) -> impl Responder {
    let request = payload.into_inner();
    let mappings = auto_map(&request.placeholders, &request.data_fields);
    HttpResponse::Ok().json(mapping_response(&request.placeholders, mappings))
}

/// Actix web handler for `POST /api/mapping/set`.
///
/// # Arguments
/// * `payload` - The placeholders, the current mapping and the binding to apply.
///
/// # Returns
/// `200 OK` with a `MappingResponse` in which `placeholder` is bound to
/// `data_field` only, replacing any earlier binding.
pub async fn set(payload: web::Json<SetMappingRequest>) -> impl Responder {
    let request = payload.into_inner();
    let mappings = set_mapping(&request.mappings, &request.placeholder, &request.data_field);
    HttpResponse::Ok().json(mapping_response(&request.placeholders, mappings))
}

fn mapping_response(placeholders: &[String], mappings: Vec<FieldMapping>) -> MappingResponse {
    MappingResponse {
        complete: !placeholders.is_empty() && is_complete(placeholders, &mappings),
        unmapped: unmapped(placeholders, &mappings),
        mappings,
    }
}
