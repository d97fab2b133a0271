use bytes::Bytes;
use patternland_core::models::{
    Message, PatternCreate, PatternFilter, PatternPublic, PatternUpdate, PatternsPublic,
    UploadFilesRequest,
};
use patternland_core::{AppError, Page};
use reqwest::multipart::{Form, Part};
use uuid::Uuid;

use crate::{ApiClient, Result};

/// Build the multipart body for the upload endpoint: the `id` field followed by
/// one part per populated slot. Unselected slots are left out.
pub fn upload_form(request: &UploadFilesRequest) -> Result<Form> {
    let mut form = Form::new().text("id", request.id.to_string());

    for (slot, file) in request.files.iter() {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(ref content_type) = file.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                AppError::InvalidInput(format!(
                    "Invalid content type {} for {}: {}",
                    content_type, slot, e
                ))
            })?;
        }
        form = form.part(slot.form_field(), part);
    }

    Ok(form)
}

impl ApiClient {
    /// List patterns, newest first, with optional filters.
    pub async fn read_patterns(&self, page: Page, filter: &PatternFilter) -> Result<PatternsPublic> {
        let mut query = page.to_query();
        query.extend(filter.to_query());
        self.get("/patterns/", &query).await
    }

    pub async fn read_pattern(&self, id: Uuid) -> Result<PatternPublic> {
        self.get(&format!("/patterns/{}", id), &[]).await
    }

    /// Create a pattern record without files.
    pub async fn create_pattern(&self, body: &PatternCreate) -> Result<PatternPublic> {
        self.post_json("/patterns/", body).await
    }

    pub async fn update_pattern(&self, id: Uuid, body: &PatternUpdate) -> Result<PatternPublic> {
        self.put_json(&format!("/patterns/{}", id), body).await
    }

    /// Delete a pattern; the server removes its stored files.
    pub async fn delete_pattern(&self, id: Uuid) -> Result<Message> {
        self.delete(&format!("/patterns/{}", id)).await
    }

    /// Attach files to an existing pattern. Replaces files in the sent slots only.
    pub async fn upload_files(&self, request: &UploadFilesRequest) -> Result<PatternPublic> {
        let form = upload_form(request)?;
        self.post_multipart("/patterns/upload/", form).await
    }

    /// Fetch a stored file by its opaque name.
    pub async fn download_file(&self, filename: &str) -> Result<Bytes> {
        validate_filename(filename)?;
        self.get_bytes(&format!(
            "/patterns/download/{}",
            urlencoding::encode(filename)
        ))
        .await
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(AppError::InvalidInput(format!(
            "Invalid file name: {:?}",
            filename
        )));
    }
    Ok(())
}
