use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored JSON file with its user-supplied metadata and raw content.
///
/// `file_name` is the primary key: no two entries in a [`FilesState`]
/// share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_name: String,
    pub title: String,
    pub description: String,
    /// Derived once at upload time from the description; never recomputed.
    pub valid: bool,
    pub content: String,
}

/// Display projection of a [`StoredFile`] without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRow {
    pub file_name: String,
    pub title: String,
    pub description: String,
    pub valid: bool,
}

impl From<&StoredFile> for FileRow {
    fn from(file: &StoredFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            title: file.title.clone(),
            description: file.description.clone(),
            valid: file.valid,
        }
    }
}

/// The whole file list, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesState {
    pub items: Vec<StoredFile>,
}

impl FilesState {
    pub fn new(items: Vec<StoredFile>) -> Self {
        Self { items }
    }
}

/// Shared, immutable snapshot handed to readers.
pub type Snapshot = Arc<FilesState>;

/// One step of a simulated upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Percentage in `0..=100`.
    pub progress: u8,
    pub content: String,
}

/// Paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileRow>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
