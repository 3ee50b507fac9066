use super::schema::{FileRow, FilesState, StoredFile};

/// Rows for display, in list order.
pub fn rows(state: &FilesState) -> Vec<FileRow> {
    state.items.iter().map(FileRow::from).collect()
}

pub fn count(state: &FilesState) -> usize {
    state.items.len()
}

/// Exact, case-sensitive name match.
pub fn exists(state: &FilesState, file_name: &str) -> bool {
    state.items.iter().any(|f| f.file_name == file_name)
}

pub fn find<'a>(state: &'a FilesState, file_name: &str) -> Option<&'a StoredFile> {
    state.items.iter().find(|f| f.file_name == file_name)
}
