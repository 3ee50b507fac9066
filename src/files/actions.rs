use super::schema::StoredFile;

/// Every state transition the store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Items offered for hydration. Not acted on by the reducer.
    HydrateRequest { items: Vec<StoredFile> },
    /// Replace the whole list.
    HydrateApply { items: Vec<StoredFile> },
    AddFile { item: StoredFile },
    DeleteFile { file_name: String },
    /// A snapshot of `count` files reached durable storage.
    PersistSuccess { count: usize },
}

impl Action {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HydrateRequest { .. } => "hydrate_request",
            Self::HydrateApply { .. } => "hydrate_apply",
            Self::AddFile { .. } => "add_file",
            Self::DeleteFile { .. } => "delete_file",
            Self::PersistSuccess { .. } => "persist_success",
        }
    }

    /// Actions after which the file list must be written back.
    pub fn changes_files(&self) -> bool {
        matches!(
            self,
            Self::HydrateApply { .. } | Self::AddFile { .. } | Self::DeleteFile { .. }
        )
    }
}
