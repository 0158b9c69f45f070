//! # Template Save Service
//!
//! Handles `POST /api/templates/save` (multipart) and `POST /api/templates`
//! (JSON). Both end in [`save_template`], which:
//!
//! 1.  Validates the name, and the content of text templates.
//! 2.  Reuses the stored record when the request carries a known `id`, so the
//!     creation time and the stored Word document survive an update.
//! 3.  Derives the placeholder list: `{{name}}` tags of the text content, or
//!     `{name}` tags of the Word document text.
//! 4.  Persists the record, and the new Word document if one was sent.
//!
//! Parsing the document and touching SQLite are blocking, so the work runs
//! through `web::block`.

use crate::engine::docx::DocxTemplate;
use crate::engine::extract::extract_text_placeholders;
use crate::error::ServiceError;
use crate::services::multipart::read_form;
use crate::state::AppState;
use crate::storage::TemplateStore;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use common::model::template::Template;
use common::requests::SaveTemplateRequest;
use log::{debug, warn};
use std::borrow::Cow;
use uuid::Uuid;

/// Handler for the multipart variant.
pub async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    respond(save_from_form(&state, payload).await)
}

/// Handler for the JSON variant.
pub async fn process_json(
    state: web::Data<AppState>,
    payload: web::Json<SaveTemplateRequest>,
) -> impl Responder {
    respond(save_in_background(&state, payload.into_inner(), None).await)
}

fn respond(result: Result<Template, ServiceError>) -> HttpResponse {
    match result {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => {
            warn!("Failed to save template: {}", e);
            e.error_response()
        }
    }
}

async fn save_from_form(state: &AppState, payload: Multipart) -> Result<Template, ServiceError> {
    let mut form = read_form(payload).await?;
    form.file_with_extension(".docx")?;

    let json = form
        .json
        .take()
        .ok_or_else(|| ServiceError::Upload("missing 'json' part".to_string()))?;
    let request: SaveTemplateRequest = serde_json::from_slice(&json)
        .map_err(|e| ServiceError::Invalid(format!("invalid template JSON: {}", e)))?;

    save_in_background(state, request, form.file.map(|file| file.bytes)).await
}

async fn save_in_background(
    state: &AppState,
    request: SaveTemplateRequest,
    upload: Option<Vec<u8>>,
) -> Result<Template, ServiceError> {
    let store = state.templates.clone();
    web::block(move || save_template(store.as_ref(), request, upload))
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
}

/// Creates or updates a template. `upload` takes precedence over an inline
/// base64 document.
pub(crate) fn save_template(
    store: &dyn TemplateStore,
    request: SaveTemplateRequest,
    upload: Option<Vec<u8>>,
) -> Result<Template, ServiceError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServiceError::Invalid("template name must not be empty".to_string()));
    }
    if !request.is_word_template && request.content.trim().is_empty() {
        return Err(ServiceError::Invalid("template content must not be empty".to_string()));
    }

    let id = request
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let existing = match id.as_deref() {
        Some(id) => store.get(id)?,
        None => None,
    };

    let inline = request
        .word_document_base64
        .as_deref()
        .map(|encoded| STANDARD.decode(encoded.trim()))
        .transpose()
        .map_err(|e| ServiceError::Invalid(format!("invalid base64 document: {}", e)))?;
    let document = upload.or(inline);

    let (content, placeholders) = if request.is_word_template {
        let stored_path = existing.as_ref().and_then(|t| t.storage_path.as_deref());
        let bytes: Cow<[u8]> = match (&document, stored_path) {
            (Some(bytes), _) => Cow::Borrowed(bytes.as_slice()),
            (None, Some(path)) => Cow::Owned(
                store
                    .fetch_binary(path)?
                    .ok_or_else(|| ServiceError::NotFound(format!("document {}", path)))?,
            ),
            (None, None) => {
                return Err(ServiceError::Invalid(
                    "a Word template needs a .docx document".to_string(),
                ))
            }
        };
        (String::new(), DocxTemplate::load(&bytes)?.placeholders()?)
    } else {
        let placeholders = extract_text_placeholders(&request.content);
        (request.content, placeholders)
    };

    let now = Utc::now();
    let template = Template {
        id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: name.to_string(),
        content,
        placeholders,
        is_word_template: request.is_word_template,
        // Text templates never reference a document, even when replacing a Word one.
        storage_path: existing
            .as_ref()
            .filter(|_| request.is_word_template)
            .and_then(|t| t.storage_path.clone()),
        created_at: existing.as_ref().map_or(now, |t| t.created_at),
        updated_at: now,
    };

    let saved = store.save(&template, document.as_deref())?;
    debug!(
        "Saved template {} '{}' with {} placeholders",
        saved.id,
        saved.name,
        saved.placeholders.len()
    );
    Ok(saved)
}
