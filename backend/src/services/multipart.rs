//! Collects the `json` and `file` parts of a multipart upload.

use crate::error::ServiceError;
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use log::debug;

pub(crate) struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct UploadForm {
    /// Raw bytes of the `json` part.
    pub json: Option<Vec<u8>>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// The file part, if its name ends with `extension` (case-insensitive).
    pub fn file_with_extension(
        &self,
        extension: &str,
    ) -> Result<Option<&UploadedFile>, ServiceError> {
        match &self.file {
            Some(file) if !file.file_name.to_lowercase().ends_with(extension) => Err(
                ServiceError::Upload(format!("The file must end with {}", extension)),
            ),
            other => Ok(other.as_ref()),
        }
    }
}

pub(crate) async fn read_form(mut payload: Multipart) -> Result<UploadForm, ServiceError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::Upload(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("json") => form.json = Some(read_field(&mut field).await?),
            Some("file") => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let bytes = read_field(&mut field).await?;
                debug!("Received upload '{}' ({} bytes)", file_name, bytes.len());
                form.file = Some(UploadedFile { file_name, bytes });
            }
            other => {
                debug!("Ignoring multipart field {:?}", other);
                read_field(&mut field).await?;
            }
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, ServiceError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ServiceError::Upload(e.to_string()))?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
