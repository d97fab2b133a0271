use bytes::Bytes;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// One of the eight attachment positions on a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSlot {
    Icon,
    A0,
    A0Sa,
    A0SaProjector,
    A0Projector,
    A4,
    A4Sa,
    Instructables,
}

impl FileSlot {
    /// Upload order; also the order of the multipart parts.
    pub const ALL: [FileSlot; 8] = [
        FileSlot::Icon,
        FileSlot::A0,
        FileSlot::A0Sa,
        FileSlot::A0SaProjector,
        FileSlot::A0Projector,
        FileSlot::A4,
        FileSlot::A4Sa,
        FileSlot::Instructables,
    ];

    /// The downloadable pattern files (everything except the icon).
    pub const PATTERN_FILES: [FileSlot; 7] = [
        FileSlot::A0,
        FileSlot::A0Sa,
        FileSlot::A0SaProjector,
        FileSlot::A0Projector,
        FileSlot::A4,
        FileSlot::A4Sa,
        FileSlot::Instructables,
    ];

    /// Multipart field name on the upload endpoint
    pub fn form_field(&self) -> &'static str {
        match self {
            FileSlot::Icon => "icon",
            FileSlot::A0 => "pattern_a0_file",
            FileSlot::A0Sa => "pattern_a0_sa_file",
            FileSlot::A0SaProjector => "pattern_a0_sa_projector_file",
            FileSlot::A0Projector => "pattern_a0_projector_file",
            FileSlot::A4 => "pattern_a4_file",
            FileSlot::A4Sa => "pattern_a4_sa_file",
            FileSlot::Instructables => "pattern_instructables_file",
        }
    }

    /// Field on the stored record holding the blob name
    pub fn record_field(&self) -> &'static str {
        match self {
            FileSlot::Icon => "icon",
            FileSlot::A0 => "pattern_a0_file_id",
            FileSlot::A0Sa => "pattern_a0_sa_file_id",
            FileSlot::A0SaProjector => "pattern_a0_sa_projector_file_id",
            FileSlot::A0Projector => "pattern_a0_projector_file_id",
            FileSlot::A4 => "pattern_a4_file_id",
            FileSlot::A4Sa => "pattern_a4_sa_file_id",
            FileSlot::Instructables => "pattern_instructables_file_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileSlot::Icon => "Icon",
            FileSlot::A0 => "A0",
            FileSlot::A0Sa => "A0 SA",
            FileSlot::A0SaProjector => "A0 SA Projector",
            FileSlot::A0Projector => "A0 Projector",
            FileSlot::A4 => "A4",
            FileSlot::A4Sa => "A4 SA",
            FileSlot::Instructables => "Instructions",
        }
    }

    fn index(&self) -> usize {
        match self {
            FileSlot::Icon => 0,
            FileSlot::A0 => 1,
            FileSlot::A0Sa => 2,
            FileSlot::A0SaProjector => 3,
            FileSlot::A0Projector => 4,
            FileSlot::A4 => 5,
            FileSlot::A4Sa => 6,
            FileSlot::Instructables => 7,
        }
    }
}

impl Display for FileSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.form_field())
    }
}

impl FromStr for FileSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileSlot::ALL
            .iter()
            .copied()
            .find(|slot| slot.form_field() == s || slot.record_field() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid file slot: {}", s))
    }
}

/// A file selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a local file. Paths containing `..` are rejected.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        if path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(AppError::InvalidInput(format!(
                "Invalid file path: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_for_extension)
            .map(str::to_string);

        Ok(Self {
            file_name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "zip" => Some("application/zip"),
        _ => None,
    }
}

/// File selections keyed by slot. Unselected slots are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternFiles {
    slots: [Option<FileUpload>; 8],
}

impl PatternFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: FileSlot, file: FileUpload) -> Self {
        self.set(slot, Some(file));
        self
    }

    pub fn set(&mut self, slot: FileSlot, file: Option<FileUpload>) {
        self.slots[slot.index()] = file;
    }

    pub fn get(&self, slot: FileSlot) -> Option<&FileUpload> {
        self.slots[slot.index()].as_ref()
    }

    /// Populated slots in upload order
    pub fn iter(&self) -> impl Iterator<Item = (FileSlot, &FileUpload)> {
        FileSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|file| (slot, file)))
    }

    pub fn populated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }
}

/// Body of `POST /patterns/upload/`: the target id plus the selected files
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFilesRequest {
    pub id: Uuid,
    pub files: PatternFiles,
}
