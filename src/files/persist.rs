//! Keeps the durable snapshot in step with the live file list.

use super::actions::Action;
use super::schema::{FilesState, StoredFile};
use super::storage::{Storage, StorageError};
use super::store::{Store, StoreHook};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Storage key the snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "gyj.files.v1";

/// Parses a stored snapshot. Anything that is not an array of complete
/// five-field records yields an empty list.
pub fn decode_snapshot(raw: &str) -> Vec<StoredFile> {
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<StoredFile>>(raw) {
        Ok(items) => items,
        Err(e) => {
            debug!(error = %e, "discarding malformed snapshot");
            Vec::new()
        }
    }
}

pub fn encode_snapshot(items: &[StoredFile]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(items)?)
}

/// Post-commit hook that writes the file list after every change.
pub struct PersistenceSync {
    storage: Arc<dyn Storage>,
    key: String,
}

impl PersistenceSync {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Reads the snapshot; read failures count as an empty list.
    pub fn load(&self) -> Vec<StoredFile> {
        match self.storage.get(&self.key) {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Writes `state` and returns how many files were written.
    pub fn write(&self, state: &FilesState) -> Result<usize, StorageError> {
        let raw = encode_snapshot(&state.items)?;
        self.storage.set(&self.key, &raw)?;
        Ok(state.items.len())
    }

    /// Builds a store hydrated from storage with this hook registered.
    ///
    /// The hydration write-back goes through the hook like any other change.
    pub fn boot(self) -> Store {
        let items = self.load();
        info!(key = %self.key, count = items.len(), "hydrating file list");
        let mut store = Store::new();
        store.register_hook(self);
        store.dispatch(Action::HydrateApply { items });
        store
    }
}

impl StoreHook for PersistenceSync {
    fn after_commit(&mut self, action: &Action, state: &FilesState) -> Option<Action> {
        if !action.changes_files() {
            return None;
        }
        match self.write(state) {
            Ok(count) => Some(Action::PersistSuccess { count }),
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot write failed, keeping in-memory state");
                None
            }
        }
    }
}
