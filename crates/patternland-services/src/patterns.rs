//! Pattern queries and mutations
//!
//! The central operation is [`PatternService::create_with_files`], which
//! creates the record from the form fields and then uploads the selected files
//! against the id the server returned. The two calls are strictly sequential
//! and are settled as one mutation: a single success or error notification,
//! followed by invalidation of the pattern list queries.
//!
//! If the upload fails after the create succeeded, the record stays on the
//! server without files. Nothing is rolled back; the orphaned id is logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use patternland_core::models::{
    FileSlot, PatternCreate, PatternFiles, PatternFilter, PatternPublic, PatternsPublic,
    UploadFilesRequest, UserPublic,
};
use patternland_core::{AddPatternForm, AppError, EditPatternForm, Page, PatternForm};
use serde_json::json;
use uuid::Uuid;

use crate::backend::PatternBackend;
use crate::mutation::{log_failure, Invalidate, MutationContext, MutationHooks};
use crate::query_cache::QueryKey;

pub const PATTERN_AND_FILES_UPLOADED: &str = "Pattern and files uploaded successfully.";
pub const PATTERN_CREATED: &str = "Pattern created successfully.";
pub const FILES_UPLOADED: &str = "Files uploaded successfully.";
pub const PATTERN_UPDATED: &str = "Pattern updated successfully.";
pub const PATTERN_DELETED: &str = "The pattern was deleted successfully.";
pub const PATTERN_DELETE_FAILED: &str = "An error occurred while deleting the pattern.";
pub const FILE_DOWNLOADED: &str = "File downloaded.";
pub const DOWNLOAD_FAILED: &str = "Download failed";

/// One row of the files view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFileEntry {
    pub slot: FileSlot,
    pub label: &'static str,
    /// Stored blob name, `None` when nothing was uploaded for the slot
    pub file_id: Option<String>,
}

impl PatternFileEntry {
    pub fn is_available(&self) -> bool {
        self.file_id.is_some()
    }
}

/// The seven pattern-file slots of `pattern` with their availability.
pub fn pattern_files(pattern: &PatternPublic) -> Vec<PatternFileEntry> {
    FileSlot::PATTERN_FILES
        .iter()
        .map(|slot| PatternFileEntry {
            slot: *slot,
            label: slot.label(),
            file_id: pattern.file_id(*slot).map(str::to_string),
        })
        .collect()
}

/// Cache key of one list page, e.g. `["patterns",{"page":2}]`
pub fn list_key(page: Page, filter: &PatternFilter) -> QueryKey {
    let key = QueryKey::patterns().with(json!({ "page": page.number }));
    if filter == &PatternFilter::default() {
        key
    } else {
        key.with(filter)
    }
}

/// Pattern operations over a [`PatternBackend`]
pub struct PatternService<B> {
    backend: Arc<B>,
    ctx: MutationContext,
}

impl<B> Clone for PatternService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ctx: self.ctx.clone(),
        }
    }
}

impl<B: PatternBackend> PatternService<B> {
    pub fn new(backend: Arc<B>, ctx: MutationContext) -> Self {
        Self { backend, ctx }
    }

    pub fn context(&self) -> &MutationContext {
        &self.ctx
    }

    /// One page of the pattern list, served from the cache while fresh.
    pub async fn list(&self, page: Page, filter: &PatternFilter) -> Result<PatternsPublic, AppError> {
        let key = list_key(page, filter);
        self.ctx
            .cache()
            .fetch(&key, || self.backend.list_patterns(page, filter))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<PatternPublic, AppError> {
        let key = QueryKey::patterns().with(id);
        self.ctx
            .cache()
            .fetch(&key, || self.backend.get_pattern(id))
            .await
    }

    /// Create a pattern from the add form, then upload its files.
    ///
    /// An invalid form is rejected before any request is made, without a
    /// notification. On success the form is reset to its defaults; on failure
    /// it is left as entered.
    #[tracing::instrument(skip(self, form), fields(title = %form.fields.title, files = form.files.populated()))]
    pub async fn create_with_files(
        &self,
        form: &mut AddPatternForm,
    ) -> Result<PatternPublic, AppError> {
        let body = form.fields.to_create().inspect_err(|err| {
            tracing::debug!(error = %err, "Add pattern form rejected");
        })?;

        let hooks = MutationHooks::new("create_pattern_with_files")
            .on_success(PATTERN_AND_FILES_UPLOADED)
            .invalidate(Invalidate::Prefix(QueryKey::patterns()));
        let result = self.create_then_upload(&body, &form.files).await;
        let pattern = self.ctx.settle(result, &hooks).await?;

        form.reset();
        Ok(pattern)
    }

    async fn create_then_upload(
        &self,
        body: &PatternCreate,
        files: &PatternFiles,
    ) -> Result<PatternPublic, AppError> {
        let created = self.backend.create_pattern(body).await?;
        tracing::debug!(pattern_id = %created.id, "Pattern created, uploading files");

        let request = UploadFilesRequest {
            id: created.id,
            files: files.clone(),
        };
        self.backend
            .upload_files(&request)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    pattern_id = %created.id,
                    error = %err,
                    "File upload failed; pattern record was created without files"
                );
            })
    }

    /// Create a pattern without files.
    #[tracing::instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create(&self, form: &mut PatternForm) -> Result<PatternPublic, AppError> {
        let body = form.to_create()?;

        let hooks = MutationHooks::new("create_pattern")
            .on_success(PATTERN_CREATED)
            .invalidate(Invalidate::Prefix(QueryKey::patterns()));
        let result = self.backend.create_pattern(&body).await;
        let pattern = self.ctx.settle(result, &hooks).await?;

        *form = PatternForm::default();
        Ok(pattern)
    }

    /// Upload files to an existing pattern. The selection is cleared on success.
    #[tracing::instrument(skip(self, files), fields(files = files.populated()))]
    pub async fn attach_files(
        &self,
        id: Uuid,
        files: &mut PatternFiles,
    ) -> Result<PatternPublic, AppError> {
        let hooks = MutationHooks::new("upload_pattern_files")
            .on_success(FILES_UPLOADED)
            .invalidate(Invalidate::Prefix(QueryKey::patterns()));
        let request = UploadFilesRequest {
            id,
            files: files.clone(),
        };
        let result = self.backend.upload_files(&request).await;
        let pattern = self.ctx.settle(result, &hooks).await?;

        *files = PatternFiles::new();
        Ok(pattern)
    }

    /// Replace a pattern's fields with the edit form. Cleared optional fields
    /// are sent as `null`.
    #[tracing::instrument(skip(self, form))]
    pub async fn edit(&self, id: Uuid, form: &EditPatternForm) -> Result<PatternPublic, AppError> {
        let body = form.to_update()?;

        let hooks = MutationHooks::new("update_pattern")
            .on_success(PATTERN_UPDATED)
            .invalidate(Invalidate::Prefix(QueryKey::patterns()));
        let result = self.backend.update_pattern(id, &body).await;
        self.ctx.settle(result, &hooks).await
    }

    /// Delete a pattern. Every cached query is invalidated afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let hooks = MutationHooks::new("delete_pattern")
            .on_success(PATTERN_DELETED)
            .on_error(PATTERN_DELETE_FAILED)
            .invalidate(Invalidate::All);
        let result = self.backend.delete_pattern(id).await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }

    /// Download a stored file into `dest_dir`, keeping its name.
    #[tracing::instrument(skip(self, dest_dir))]
    pub async fn download(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf, AppError> {
        match self.fetch_to(filename, dest_dir).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "File saved");
                self.ctx.notifier().success(FILE_DOWNLOADED);
                Ok(path)
            }
            Err(err) => {
                log_failure("download_file", &err);
                self.ctx.notifier().error(DOWNLOAD_FAILED);
                Err(err)
            }
        }
    }

    async fn fetch_to(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf, AppError> {
        let target = dest_dir.join(plain_file_name(filename)?);
        let bytes = self.backend.download_file(filename).await?;
        tokio::fs::write(&target, &bytes).await?;
        Ok(target)
    }

    /// Whether `pattern` belongs to the cached current user.
    pub async fn is_mine(&self, pattern: &PatternPublic) -> bool {
        self.ctx
            .cache()
            .get::<UserPublic>(&QueryKey::current_user())
            .await
            .is_some_and(|user| user.id == pattern.owner_id)
    }
}

/// `filename` as a single path component; anything that could leave the
/// destination directory is rejected.
fn plain_file_name(filename: &str) -> Result<&Path, AppError> {
    let path = Path::new(filename);
    match path.file_name() {
        Some(name) if name == path.as_os_str() && !filename.contains('\\') => Ok(path),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid file name: {}",
            filename
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(a4: Option<&str>) -> PatternPublic {
        serde_json::from_value(json!({
            "id": Uuid::nil(),
            "owner_id": Uuid::nil(),
            "title": "Tee Shirt",
            "description": null,
            "brand": "Seamwork",
            "version": "Digital",
            "pattern_url": null,
            "for_who": "Women",
            "category": null,
            "difficulty": 2,
            "fabric": null,
            "fabric_amount": null,
            "icon": "icon.png",
            "pattern_a4_file_id": a4
        }))
        .unwrap()
    }

    #[test]
    fn files_view_lists_pattern_slots_only() {
        let entries = pattern_files(&pattern(Some("abc-a4.pdf")));
        assert_eq!(entries.len(), 7);
        assert!(entries.iter().all(|e| e.slot != FileSlot::Icon));

        let a4 = entries.iter().find(|e| e.slot == FileSlot::A4).unwrap();
        assert!(a4.is_available());
        assert_eq!(a4.file_id.as_deref(), Some("abc-a4.pdf"));
        assert_eq!(
            entries.iter().filter(|e| e.is_available()).count(),
            1
        );
        assert_eq!(entries.last().unwrap().label, "Instructions");
    }

    #[test]
    fn plain_file_names_only() {
        assert!(plain_file_name("abc-a0.pdf").is_ok());
        assert!(plain_file_name("").is_err());
        assert!(plain_file_name("..").is_err());
        assert!(plain_file_name("../etc/passwd").is_err());
        assert!(plain_file_name("dir/file.pdf").is_err());
        assert!(plain_file_name("/abs.pdf").is_err());
        assert!(plain_file_name("dir\\file.pdf").is_err());
    }

    #[test]
    fn list_key_includes_filter_only_when_set() {
        let page = Page::new(2, 10);
        assert_eq!(
            list_key(page, &PatternFilter::default()).to_string(),
            r#"["patterns",{"page":2}]"#
        );
        let mine = PatternFilter {
            self_patterns: true,
            ..Default::default()
        };
        let key = list_key(page, &mine);
        assert_eq!(key.segments().len(), 3);
        assert!(key.starts_with(&QueryKey::patterns()));
    }
}
