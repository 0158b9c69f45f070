//! # Manual Merge Service
//!
//! `POST /api/merge/manual` renders a single document from values typed in by
//! hand. Each placeholder is bound to the value of the same name, and every
//! placeholder must have a non-empty value. On success the session's form
//! draft is cleared and the document is returned as a download.

use crate::engine::batch::merge_all;
use crate::engine::package::{package_single, NamedArtifact};
use crate::engine::render::LoadedTemplate;
use crate::error::ServiceError;
use crate::services::artifact_response;
use crate::services::merge::load_document;
use crate::services::templates::get::get_template;
use crate::state::AppState;
use actix_web::{web, Responder, ResponseError};
use common::model::dataset::Dataset;
use common::model::mapping::FieldMapping;
use common::requests::ManualMergeRequest;
use log::{info, warn};

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<ManualMergeRequest>,
) -> impl Responder {
    let state = state.get_ref().clone();
    let result = web::block(move || merge_manual(&state, payload.into_inner()))
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))
        .and_then(|result| result);
    match result {
        Ok(artifact) => artifact_response(artifact),
        Err(e) => {
            warn!("Manual merge rejected: {}", e);
            e.error_response()
        }
    }
}

pub(crate) fn merge_manual(
    state: &AppState,
    request: ManualMergeRequest,
) -> Result<NamedArtifact, ServiceError> {
    let template = get_template(state, &request.template_id)?;

    let empty: Vec<&str> = template
        .placeholders
        .iter()
        .filter(|placeholder| request.values.is_blank(placeholder))
        .map(String::as_str)
        .collect();
    if !empty.is_empty() {
        return Err(ServiceError::Invalid(format!(
            "Please fill in all fields: {}",
            empty.join(", ")
        )));
    }

    let mappings: Vec<FieldMapping> = template
        .placeholders
        .iter()
        .map(|placeholder| FieldMapping::new(placeholder.as_str(), placeholder.as_str()))
        .collect();
    let document = load_document(state.templates.as_ref(), &template)?;
    let loaded = LoadedTemplate::from_template(&template, document.as_deref())?;

    let dataset = Dataset {
        id: format!("manual-{}", template.id),
        field_names: template.placeholders.clone(),
        rows: vec![request.values],
    };
    let merged = merge_all(&loaded, &dataset, &mappings)?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::Task("no document was rendered".to_string()))?;

    if let Some(session_id) = request.session_id.as_deref() {
        state.drafts.clear(session_id)?;
    }
    info!("Manual merge of template {} done", template.id);
    Ok(package_single(&merged.content, merged.index))
}
